use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cartfill_schemas::OrderLine;
use tracing::debug;

use crate::rows::{build_line, QuantityCell};
use crate::OrderSource;

/// Order lines from a local CSV export of the order sheet.
#[derive(Debug, Clone)]
pub struct CsvOrderSource {
    path: PathBuf,
}

impl CsvOrderSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse CSV text directly (header row first).
    pub fn parse_str(text: &str) -> Result<Vec<OrderLine>> {
        parse_reader(text.as_bytes())
    }
}

fn parse_reader<R: std::io::Read>(rdr: R) -> Result<Vec<OrderLine>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(rdr);

    let mut out = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        // header is row 1
        let rec = rec.with_context(|| format!("read csv record {}", idx + 1))?;
        let row = rec
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        let cell = |i: usize| rec.get(i).unwrap_or("");

        if let Some(line) = build_line(row, cell(0), QuantityCell::Text(cell(1).to_string()), cell(2))? {
            out.push(line);
        }
    }
    Ok(out)
}

#[async_trait::async_trait]
impl OrderSource for CsvOrderSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn load(&self) -> Result<Vec<OrderLine>> {
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("open orders csv: {}", self.path.display()))?;
        let lines = parse_reader(file)
            .with_context(|| format!("parse orders csv: {}", self.path.display()))?;
        debug!(path = %self.path.display(), lines = lines.len(), "loaded orders csv");
        Ok(lines)
    }
}
