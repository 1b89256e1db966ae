//! Command handler modules for the `cartfill` CLI.
//!
//! Shared config/secrets/order-source wiring lives here.
//! Command-specific logic lives in the submodules.

pub mod login;
pub mod orders;
pub mod run;

use anyhow::{Context, Result};
use cartfill_config::secrets::{resolve_secrets_for_mode, ResolvedSecrets};
use cartfill_config::{
    report_unused_keys, ConfigMode, LoadedConfig, OrderSourceSettings, RunSettings,
    UnusedKeyPolicy,
};
use cartfill_orders::{CsvOrderSource, OrderSource, SheetsOrderSource};
use cartfill_resolve::Credentials;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

pub struct RunConfig {
    pub loaded: LoadedConfig,
    pub settings: RunSettings,
    pub secrets: ResolvedSecrets,
}

/// Load layered config, enforce the unused-key policy for its mode
/// (LIVE fails, PAPER warns), then resolve secrets from the environment.
pub fn load_run_config(config_paths: &[String]) -> Result<RunConfig> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = cartfill_config::load_layered_yaml(&path_refs)?;
    let settings = RunSettings::from_config_json(&loaded.config_json)?;

    let policy = match settings.mode {
        ConfigMode::Live => UnusedKeyPolicy::Fail,
        ConfigMode::Paper => UnusedKeyPolicy::Warn,
    };
    let report = report_unused_keys(settings.mode, &loaded.config_json, policy)?;
    if !report.is_clean() {
        eprintln!(
            "WARN: CONFIG_UNUSED_KEYS mode={} unused_leaf_keys={}",
            report.mode,
            report.unused_leaf_pointers.len()
        );
        for p in report.unused_leaf_pointers.iter().take(50) {
            eprintln!("  unused={}", p);
        }
        let extra = report.unused_leaf_pointers.len().saturating_sub(50);
        if extra > 0 {
            eprintln!("  ... and {} more", extra);
        }
    }

    let secrets = resolve_secrets_for_mode(&loaded.config_json, settings.mode.as_str())?;

    Ok(RunConfig {
        loaded,
        settings,
        secrets,
    })
}

// ---------------------------------------------------------------------------
// Wiring helpers
// ---------------------------------------------------------------------------

/// Order source for this run. `--orders-csv` wins over the configured source.
pub fn order_source(cfg: &RunConfig, orders_csv: Option<PathBuf>) -> Result<Box<dyn OrderSource>> {
    if let Some(path) = orders_csv {
        return Ok(Box::new(CsvOrderSource::new(path)));
    }
    match &cfg.settings.orders {
        OrderSourceSettings::Csv { path } => Ok(Box::new(CsvOrderSource::new(path.clone()))),
        OrderSourceSettings::Sheets { range } => {
            let spreadsheet_id = cfg
                .secrets
                .sheets_spreadsheet_id
                .clone()
                .context("sheets source selected but spreadsheet id is not resolved")?;
            let api_key = cfg
                .secrets
                .sheets_api_key
                .clone()
                .context("sheets source selected but api key is not resolved")?;
            Ok(Box::new(SheetsOrderSource::new(
                spreadsheet_id,
                range.clone(),
                api_key,
            )))
        }
    }
}

/// Storefront credentials. PAPER runs accept anything, so missing env vars
/// fall back to a fixed placeholder there.
pub fn credentials(cfg: &RunConfig) -> Result<Credentials> {
    match (
        &cfg.secrets.storefront_email,
        &cfg.secrets.storefront_password,
    ) {
        (Some(email), Some(password)) => Ok(Credentials::new(email.clone(), password.clone())),
        _ if cfg.settings.mode == ConfigMode::Paper => Ok(Credentials::new("paper", "paper")),
        _ => anyhow::bail!("storefront credentials are not resolved for mode=LIVE"),
    }
}

/// Stable-ish, non-sensitive host fingerprint for run attribution.
pub fn host_fingerprint() -> String {
    let hostname = std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "UNKNOWN_HOST".to_string());
    let username = std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "UNKNOWN_USER".to_string());
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    format!("{hostname}|{username}|{os}|{arch}")
}
