//! `cartfill check-orders`: dry ingestion with derived match patterns.

use anyhow::{Context, Result};
use cartfill_resolve::MatchPattern;
use std::path::PathBuf;

use super::{load_run_config, order_source};

pub async fn check_orders(config_paths: Vec<String>, orders_csv: Option<PathBuf>) -> Result<()> {
    let cfg = load_run_config(&config_paths)?;
    let source = order_source(&cfg, orders_csv)?;
    let lines = source
        .load()
        .await
        .with_context(|| format!("load orders from {} source failed", source.name()))?;

    let mut invalid = 0usize;
    for (idx, line) in lines.iter().enumerate() {
        let pattern = match MatchPattern::derive(&line.primary_code) {
            Ok(p) => p.as_str().to_string(),
            Err(e) => {
                invalid += 1;
                format!("INVALID ({e})")
            }
        };
        println!(
            "line={} code={} quantity={} fallback={} pattern={}",
            idx + 1,
            line.primary_code,
            line.quantity.as_str(),
            line.fallback_code,
            pattern
        );
    }

    println!("source={}", source.name());
    println!("lines={}", lines.len());
    println!("invalid_patterns={}", invalid);
    Ok(())
}
