use anyhow::{anyhow, Context, Result};
use cartfill_schemas::OrderLine;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::rows::{build_line, QuantityCell};
use crate::OrderSource;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

/// Google Sheets values API backed order source (read-only, API key auth).
///
/// API key is read by the caller (CLI) and passed in; do not log it.
#[derive(Clone)]
pub struct SheetsOrderSource {
    spreadsheet_id: String,
    range: String,
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for SheetsOrderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsOrderSource")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("range", &self.range)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SheetsOrderSource {
    pub fn new(spreadsheet_id: String, range: String, api_key: String) -> Self {
        Self::new_with_base_url(spreadsheet_id, range, api_key, DEFAULT_SHEETS_BASE_URL.to_string())
    }

    pub fn new_with_base_url(
        spreadsheet_id: String,
        range: String,
        api_key: String,
        base_url: String,
    ) -> Self {
        Self {
            spreadsheet_id,
            range,
            api_key,
            base_url,
            http: reqwest::Client::new(),
        }
    }

    fn build_values_url(&self) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("invalid sheets base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("sheets base url cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", self.range.as_str()]);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl OrderSource for SheetsOrderSource {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn load(&self) -> Result<Vec<OrderLine>> {
        let url = self.build_values_url()?;
        let resp = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .context("sheets request failed")?;

        let status = resp.status();
        let body: ValuesResponse = resp
            .json()
            .await
            .context("sheets response json decode failed")?;

        if !status.is_success() {
            return Err(anyhow!(
                "sheets http error status={} message={}",
                status.as_u16(),
                body.error_message()
            ));
        }

        let rows = body.values.unwrap_or_default();
        if rows.is_empty() {
            return Err(anyhow!("no data found in range {}", self.range));
        }

        let mut out = Vec::new();
        for (idx, cells) in rows.iter().enumerate().skip(1) {
            let text = |i: usize| cells.get(i).map(cell_text).unwrap_or_default();
            let quantity = match cells.get(1) {
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(f) => QuantityCell::Number(f),
                    None => QuantityCell::Text(n.to_string()),
                },
                other => QuantityCell::Text(other.map(cell_text).unwrap_or_default()),
            };
            if let Some(line) = build_line(idx + 1, &text(0), quantity, &text(2))? {
                out.push(line);
            }
        }

        debug!(range = self.range.as_str(), lines = out.len(), "loaded orders from sheet");
        Ok(out)
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    values: Option<Vec<Vec<Value>>>,
    error: Option<ApiError>,
}

impl ValuesResponse {
    fn error_message(&self) -> String {
        match &self.error {
            Some(e) => format!("code={} {}", e.code.unwrap_or_default(), e.message.as_deref().unwrap_or("unknown")),
            None => "unknown".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<i64>,
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_url_is_built_under_base() {
        let src = SheetsOrderSource::new_with_base_url(
            "sheet-1".into(),
            "Orders!A:C".into(),
            "k".into(),
            "http://localhost:9999/".into(),
        );
        let url = src.build_values_url().unwrap();
        assert_eq!(url.path(), "/v4/spreadsheets/sheet-1/values/Orders!A:C");
    }

    #[test]
    fn debug_hides_api_key() {
        let src = SheetsOrderSource::new("s".into(), "A:C".into(), "secret-key".into());
        assert!(!format!("{src:?}").contains("secret-key"));
    }

    #[test]
    fn cell_text_renders_scalars() {
        assert_eq!(cell_text(&Value::String("A1".into())), "A1");
        assert_eq!(cell_text(&serde_json::json!(3)), "3");
        assert_eq!(cell_text(&Value::Null), "");
    }
}
