//! Run export directory: `exports/<run_id>/`.
//!
//! - `manifest.json`: run identity, mode, config hash, host fingerprint
//! - `report.json`: the full `RunReport`
//! - `outcomes.csv`: one row per order line

use anyhow::{Context, Result};
use cartfill_schemas::{LineOutcome, ResolutionOutcome, RunReport, RunStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SCHEMA_VERSION: i32 = 1;

pub const OUTCOMES_CSV_HEADER: [&str; 8] = [
    "position",
    "primary_code",
    "quantity",
    "fallback_code",
    "outcome",
    "path",
    "variant_code",
    "detail",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub mode: String,
    pub status: String,
    pub config_hash: String,
    pub host_fingerprint: String,
    pub created_at_utc: DateTime<Utc>,
    pub artifacts: ArtifactList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactList {
    pub manifest_json: String,
    pub report_json: String,
    pub outcomes_csv: String,
}

/// One `outcomes.csv` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRow {
    pub position: usize,
    pub primary_code: String,
    pub quantity: String,
    pub fallback_code: String,
    pub outcome: String,
    pub path: String,
    pub variant_code: String,
    pub detail: String,
}

pub struct WriteRunArtifactsArgs<'a> {
    pub exports_root: &'a Path,
    pub mode: &'a str,
    pub config_hash: &'a str,
    pub host_fingerprint: &'a str,
    pub report: &'a RunReport,
}

pub struct WriteRunArtifactsResult {
    pub run_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub report_path: PathBuf,
    pub outcomes_path: PathBuf,
}

pub fn outcome_rows(report: &RunReport) -> Vec<OutcomeRow> {
    report
        .records
        .iter()
        .map(|r| {
            let (path, variant_code, detail) = match &r.outcome {
                LineOutcome::Resolved(ResolutionOutcome::Fulfilled {
                    path,
                    candidate,
                    variant_code,
                    ..
                }) => (
                    path.as_str().to_string(),
                    variant_code.clone(),
                    format!("candidate={candidate}"),
                ),
                LineOutcome::Resolved(_) => (String::new(), String::new(), String::new()),
                LineOutcome::Failed(f) => (String::new(), String::new(), f.to_string()),
            };
            OutcomeRow {
                position: r.position,
                primary_code: r.line.primary_code.clone(),
                quantity: r.line.quantity.as_str().to_string(),
                fallback_code: r.line.fallback_code.clone(),
                outcome: r.outcome.kind().as_str().to_string(),
                path,
                variant_code,
                detail,
            }
        })
        .collect()
}

pub fn write_run_artifacts(args: WriteRunArtifactsArgs<'_>) -> Result<WriteRunArtifactsResult> {
    let report = args.report;
    let run_dir = args.exports_root.join(report.run_id.to_string());
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("create exports dir failed: {}", run_dir.display()))?;

    let report_path = run_dir.join("report.json");
    let json = serde_json::to_string_pretty(report).context("serialize report failed")?;
    fs::write(&report_path, format!("{json}\n"))
        .with_context(|| format!("write report failed: {}", report_path.display()))?;

    let outcomes_path = run_dir.join("outcomes.csv");
    write_outcomes_csv(&outcomes_path, &outcome_rows(report))?;

    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        run_id: report.run_id,
        mode: args.mode.to_string(),
        status: match report.status {
            RunStatus::Completed => "completed".to_string(),
            RunStatus::SessionFailed(_) => "session_failed".to_string(),
        },
        config_hash: args.config_hash.to_string(),
        host_fingerprint: args.host_fingerprint.to_string(),
        created_at_utc: Utc::now(),
        artifacts: ArtifactList {
            manifest_json: "manifest.json".to_string(),
            report_json: "report.json".to_string(),
            outcomes_csv: "outcomes.csv".to_string(),
        },
    };

    let manifest_path = run_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(&manifest).context("serialize manifest failed")?;
    fs::write(&manifest_path, format!("{json}\n"))
        .with_context(|| format!("write manifest failed: {}", manifest_path.display()))?;

    Ok(WriteRunArtifactsResult {
        run_dir,
        manifest_path,
        report_path,
        outcomes_path,
    })
}

fn write_outcomes_csv(path: &Path, rows: &[OutcomeRow]) -> Result<()> {
    // header written explicitly so an empty run still gets one
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("create outcomes csv failed: {}", path.display()))?;
    w.write_record(OUTCOMES_CSV_HEADER)
        .context("write outcomes csv header failed")?;
    for row in rows {
        w.serialize(row)
            .with_context(|| format!("write outcomes row {} failed", row.position))?;
    }
    w.flush()
        .with_context(|| format!("flush outcomes csv failed: {}", path.display()))?;
    Ok(())
}
