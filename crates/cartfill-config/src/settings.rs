//! Typed view over the merged config.
//!
//! Every pointer read here must also appear in the consumption registry.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use serde_json::Value;

use crate::secrets::read_str_at;
use crate::ConfigMode;

pub const DEFAULT_COOLDOWN_MS: u64 = 1_000;
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SESSION_FILE: &str = "session.json";
pub const DEFAULT_ORDERS_CSV: &str = "orders.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub cooldown: Duration,
    pub step_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontSettings {
    /// Required in LIVE.
    pub base_url: Option<String>,
    pub request_timeout: Duration,
    pub session_file: PathBuf,
    /// Extra query parameters appended to every catalog search.
    pub extra_query: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSourceSettings {
    Csv { path: PathBuf },
    Sheets { range: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub mode: ConfigMode,
    pub runtime: RuntimeSettings,
    pub storefront: StorefrontSettings,
    pub orders: OrderSourceSettings,
    /// PAPER fixture catalog. Required in PAPER.
    pub paper_catalog_path: Option<PathBuf>,
}

impl RunSettings {
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let mode = match read_str_at(config, "/runtime/mode") {
            Some(m) => ConfigMode::parse(&m)?,
            None => ConfigMode::Paper,
        };

        let runtime = RuntimeSettings {
            cooldown: Duration::from_millis(read_ms(config, "/runtime/cooldown_ms", DEFAULT_COOLDOWN_MS)?),
            step_timeout: Duration::from_millis(read_ms(
                config,
                "/runtime/step_timeout_ms",
                DEFAULT_STEP_TIMEOUT_MS,
            )?),
        };
        if runtime.step_timeout.is_zero() {
            bail!("CONFIG_INVALID /runtime/step_timeout_ms must be > 0");
        }

        let storefront = StorefrontSettings {
            base_url: read_str_at(config, "/storefront/base_url"),
            request_timeout: Duration::from_millis(read_ms(
                config,
                "/storefront/request_timeout_ms",
                DEFAULT_REQUEST_TIMEOUT_MS,
            )?),
            session_file: read_str_at(config, "/storefront/session_file")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE)),
            extra_query: read_query(config, "/storefront/extra_query")?,
        };
        if mode == ConfigMode::Live && storefront.base_url.is_none() {
            bail!("CONFIG_MISSING mode=LIVE: /storefront/base_url is required");
        }

        let orders = match read_str_at(config, "/orders/source")
            .unwrap_or_else(|| "csv".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "csv" => OrderSourceSettings::Csv {
                path: read_str_at(config, "/orders/csv_path")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_ORDERS_CSV)),
            },
            "sheets" => match read_str_at(config, "/orders/sheets/range") {
                Some(range) => OrderSourceSettings::Sheets { range },
                None => bail!("CONFIG_MISSING: /orders/sheets/range is required when orders.source = sheets"),
            },
            other => bail!("CONFIG_INVALID /orders/source: '{}'; expected csv | sheets", other),
        };

        let paper_catalog_path = read_str_at(config, "/paper/catalog_path").map(PathBuf::from);
        if mode == ConfigMode::Paper && paper_catalog_path.is_none() {
            bail!("CONFIG_MISSING mode=PAPER: /paper/catalog_path is required");
        }

        Ok(Self {
            mode,
            runtime,
            storefront,
            orders,
            paper_catalog_path,
        })
    }
}

fn read_ms(config: &Value, pointer: &str, default: u64) -> Result<u64> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => match v.as_u64() {
            Some(ms) => Ok(ms),
            None => bail!("CONFIG_INVALID {}: expected non-negative integer milliseconds", pointer),
        },
    }
}

fn read_query(config: &Value, pointer: &str) -> Result<Vec<(String, String)>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                Value::Number(n) => Ok((k.clone(), n.to_string())),
                Value::Bool(b) => Ok((k.clone(), b.to_string())),
                _ => bail!("CONFIG_INVALID {}/{}: expected a scalar", pointer, k),
            })
            .collect(),
        Some(_) => bail!("CONFIG_INVALID {}: expected a mapping", pointer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_layered_yaml_from_strings;

    fn settings(yaml: &str) -> Result<RunSettings> {
        let cfg = load_layered_yaml_from_strings(&[yaml])?;
        RunSettings::from_config_json(&cfg.config_json)
    }

    #[test]
    fn defaults_apply() {
        let s = settings("paper:\n  catalog_path: fixtures/catalog.json\n").unwrap();
        assert_eq!(s.mode, ConfigMode::Paper);
        assert_eq!(s.runtime.cooldown, Duration::from_millis(1_000));
        assert_eq!(s.runtime.step_timeout, Duration::from_secs(60));
        assert_eq!(s.storefront.request_timeout, Duration::from_secs(30));
        assert_eq!(s.storefront.session_file, PathBuf::from("session.json"));
        assert_eq!(
            s.orders,
            OrderSourceSettings::Csv {
                path: PathBuf::from("orders.csv")
            }
        );
    }

    #[test]
    fn live_requires_base_url() {
        let err = settings("runtime:\n  mode: LIVE\n").unwrap_err();
        assert!(err.to_string().contains("/storefront/base_url"));
    }

    #[test]
    fn sheets_requires_range() {
        let err = settings(
            "paper:\n  catalog_path: c.json\norders:\n  source: sheets\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("/orders/sheets/range"));
    }

    #[test]
    fn extra_query_is_read_as_pairs() {
        let s = settings(
            r#"
runtime:
  mode: LIVE
storefront:
  base_url: "https://shop.example"
  extra_query:
    lang: de
    page_size: 50
"#,
        )
        .unwrap();
        assert_eq!(
            s.storefront.extra_query,
            vec![
                ("lang".to_string(), "de".to_string()),
                ("page_size".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn negative_timeout_is_invalid() {
        assert!(settings("paper:\n  catalog_path: c.json\nruntime:\n  cooldown_ms: -5\n").is_err());
    }
}
