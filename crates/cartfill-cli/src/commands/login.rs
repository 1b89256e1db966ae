//! `cartfill login`: fresh LIVE login, token persisted to the session file.

use anyhow::Result;
use cartfill_config::ConfigMode;
use cartfill_storefront_http::{HttpStorefront, SessionStore};

use super::{credentials, load_run_config};

pub async fn login(config_paths: Vec<String>) -> Result<()> {
    let cfg = load_run_config(&config_paths)?;
    if cfg.settings.mode != ConfigMode::Live {
        anyhow::bail!(
            "login requires mode=LIVE (got mode={}); PAPER runs need no session",
            cfg.settings.mode.as_str()
        );
    }

    let sf_cfg = &cfg.settings.storefront;
    let base_url = sf_cfg
        .base_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("storefront base_url is not configured"))?;
    let store = HttpStorefront::new(
        base_url,
        sf_cfg.request_timeout,
        SessionStore::new(sf_cfg.session_file.clone()),
        sf_cfg.extra_query.clone(),
    )?;

    let creds = credentials(&cfg)?;
    store
        .login(&creds)
        .await
        .map_err(|e| anyhow::anyhow!("LOGIN_FAILED: {e}"))?;

    println!("logged_in=true");
    println!("session_file={}", store.session_store().path().display());
    Ok(())
}
