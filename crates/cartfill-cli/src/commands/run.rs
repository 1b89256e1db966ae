//! `cartfill run`: ingest orders, resolve every line, export the report.

use anyhow::{Context, Result};
use cartfill_artifacts::{write_run_artifacts, WriteRunArtifactsArgs};
use cartfill_config::ConfigMode;
use cartfill_resolve::EnginePolicy;
use cartfill_runtime::{DriverConfig, FulfillmentDriver};
use cartfill_schemas::{LineOutcome, ResolutionOutcome, RunReport, RunStatus};
use cartfill_storefront_http::{HttpStorefront, SessionStore};
use cartfill_storefront_paper::{PaperSession, PaperStorefront};
use std::path::PathBuf;
use tracing::info;

use super::{credentials, host_fingerprint, load_run_config, order_source};

pub async fn run_fulfillment(
    config_paths: Vec<String>,
    orders_csv: Option<PathBuf>,
    exports: PathBuf,
) -> Result<()> {
    let cfg = load_run_config(&config_paths)?;
    let mode = cfg.settings.mode;

    // Malformed rows abort here, before any storefront access.
    let source = order_source(&cfg, orders_csv)?;
    let lines = source
        .load()
        .await
        .with_context(|| format!("load orders from {} source failed", source.name()))?;
    info!(source = source.name(), lines = lines.len(), "orders loaded");

    let creds = credentials(&cfg)?;
    let driver_cfg = DriverConfig {
        cooldown: cfg.settings.runtime.cooldown,
        engine: EnginePolicy {
            step_timeout: cfg.settings.runtime.step_timeout,
        },
    };

    let report = match mode {
        ConfigMode::Paper => {
            let path = cfg
                .settings
                .paper_catalog_path
                .as_deref()
                .context("paper catalog path is not configured")?;
            let store = PaperStorefront::load(path)?;
            let session = PaperSession::new();
            let driver = FulfillmentDriver::new(&session, &store, &store, &store, driver_cfg);
            let report = driver.run(&lines, &creds).await;
            println!("paper_basket_lines={}", store.basket().len());
            report
        }
        ConfigMode::Live => {
            let sf_cfg = &cfg.settings.storefront;
            let base_url = sf_cfg
                .base_url
                .as_deref()
                .context("storefront base_url is not configured")?;
            let store = HttpStorefront::new(
                base_url,
                sf_cfg.request_timeout,
                SessionStore::new(sf_cfg.session_file.clone()),
                sf_cfg.extra_query.clone(),
            )?;
            let driver = FulfillmentDriver::new(&store, &store, &store, &store, driver_cfg);
            driver.run(&lines, &creds).await
        }
    };

    let host_fp = host_fingerprint();
    let art = write_run_artifacts(WriteRunArtifactsArgs {
        exports_root: &exports,
        mode: mode.as_str(),
        config_hash: &cfg.loaded.config_hash,
        host_fingerprint: &host_fp,
        report: &report,
    })?;

    print_report(&report);
    println!("mode={}", mode.as_str());
    println!("config_hash={}", cfg.loaded.config_hash);
    println!("exports_dir={}", art.run_dir.display());

    if let RunStatus::SessionFailed(reason) = &report.status {
        anyhow::bail!(
            "SESSION_FAILED run_id={}: {}; no order lines were processed",
            report.run_id,
            reason
        );
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for r in &report.records {
        let detail = match &r.outcome {
            LineOutcome::Resolved(ResolutionOutcome::Fulfilled {
                path, variant_code, ..
            }) => format!(" path={} variant={}", path.as_str(), variant_code),
            LineOutcome::Resolved(_) => String::new(),
            LineOutcome::Failed(f) => format!(" error=\"{}\"", f),
        };
        println!(
            "line={} code={} quantity={} outcome={}{}",
            r.position,
            r.line.primary_code,
            r.line.quantity.as_str(),
            r.outcome.kind().as_str(),
            detail
        );
    }

    let s = report.summary();
    println!("run_id={}", report.run_id);
    println!("lines={}", s.lines);
    println!("fulfilled={}", s.fulfilled);
    println!("sold_out={}", s.sold_out);
    println!("no_candidate_family={}", s.no_candidate_family);
    println!("no_variant_match={}", s.no_variant_match);
    println!("exhausted_fallback={}", s.exhausted_fallback);
    println!("failed={}", s.failed);
    println!("commits={}", report.total_commits());
}
