//! Order sources.
//!
//! An order source yields the ordered `OrderLine`s of one run from a tabular
//! range: first row is a header, columns map positionally to
//! (code, quantity, fallback code), fully blank rows are skipped. A row with a
//! blank code or quantity aborts ingestion with its row number, before any
//! storefront access.

mod csv_source;
mod rows;
mod sheets;

use anyhow::Result;
use cartfill_schemas::OrderLine;

pub use csv_source::CsvOrderSource;
pub use rows::OrderRowError;
pub use sheets::{SheetsOrderSource, DEFAULT_SHEETS_BASE_URL};

/// Pluggable order source.
#[async_trait::async_trait]
pub trait OrderSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn load(&self) -> Result<Vec<OrderLine>>;
}
