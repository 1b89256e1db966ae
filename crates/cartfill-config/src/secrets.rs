//! Runtime secret resolution.
//!
//! # Contract
//! - Config YAML stores only **env var NAMES** (e.g. `"CARTFILL_EMAIL"`).
//! - Callers invoke [`resolve_secrets_for_mode`] once at startup and pass the
//!   result into constructors; no other code reads `std::env::var`.
//! - `Debug` redacts values. Errors name the env var, never its value.
//!
//! # Mode-aware enforcement
//! - `LIVE`:  storefront email + password are **required**.
//! - `PAPER`: no storefront credentials required.
//! - Either mode: when `orders.source = sheets`, the spreadsheet id and Sheets
//!   API key are **required**.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::ConfigMode;

pub const DEFAULT_EMAIL_ENV: &str = "CARTFILL_EMAIL";
pub const DEFAULT_PASSWORD_ENV: &str = "CARTFILL_PASSWORD";
pub const DEFAULT_SPREADSHEET_ID_ENV: &str = "CARTFILL_SPREADSHEET_ID";
pub const DEFAULT_SHEETS_API_KEY_ENV: &str = "CARTFILL_SHEETS_API_KEY";

/// All runtime-resolved secrets for one run.
#[derive(Clone)]
pub struct ResolvedSecrets {
    pub storefront_email: Option<String>,
    pub storefront_password: Option<String>,
    /// Not secret, but environment-specific; shown in `Debug`.
    pub sheets_spreadsheet_id: Option<String>,
    pub sheets_api_key: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field(
                "storefront_email",
                &self.storefront_email.as_ref().map(|_| "<REDACTED>"),
            )
            .field(
                "storefront_password",
                &self.storefront_password.as_ref().map(|_| "<REDACTED>"),
            )
            .field("sheets_spreadsheet_id", &self.sheets_spreadsheet_id)
            .field(
                "sheets_api_key",
                &self.sheets_api_key.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct SecretEnvNames {
    email_var: String,
    password_var: String,
    spreadsheet_id_var: String,
    sheets_api_key_var: String,
}

/// Non-blank string at `pointer`, trimmed.
pub(crate) fn read_str_at(config: &Value, pointer: &str) -> Option<String> {
    let s = config.pointer(pointer)?.as_str()?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Unset and blank values both resolve to `None`.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

fn parse_env_names(config_json: &Value) -> SecretEnvNames {
    SecretEnvNames {
        email_var: read_str_at(config_json, "/storefront/credentials_env/email")
            .unwrap_or_else(|| DEFAULT_EMAIL_ENV.to_string()),
        password_var: read_str_at(config_json, "/storefront/credentials_env/password")
            .unwrap_or_else(|| DEFAULT_PASSWORD_ENV.to_string()),
        spreadsheet_id_var: read_str_at(config_json, "/orders/sheets/spreadsheet_id_env")
            .unwrap_or_else(|| DEFAULT_SPREADSHEET_ID_ENV.to_string()),
        sheets_api_key_var: read_str_at(config_json, "/orders/sheets/api_key_env")
            .unwrap_or_else(|| DEFAULT_SHEETS_API_KEY_ENV.to_string()),
    }
}

fn require(value: &Option<String>, mode: &str, var: &str, what: &str) -> Result<()> {
    if value.is_none() {
        bail!(
            "SECRETS_MISSING mode={}: required env var '{}' ({}) is not set or empty",
            mode,
            var,
            what,
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve all secrets from the environment for `mode` (case-insensitive
/// `"LIVE"` or `"PAPER"`).
///
/// # Errors
/// The **env var NAME** of the first missing required variable, or
/// `SECRETS_UNKNOWN_MODE`.
pub fn resolve_secrets_for_mode(config_json: &Value, mode: &str) -> Result<ResolvedSecrets> {
    let mode = match ConfigMode::parse(mode) {
        Ok(m) => m,
        Err(_) => bail!(
            "SECRETS_UNKNOWN_MODE: unrecognised mode '{}'; expected one of: LIVE | PAPER",
            mode.trim(),
        ),
    };
    let names = parse_env_names(config_json);

    let secrets = ResolvedSecrets {
        storefront_email: resolve_env(&names.email_var),
        storefront_password: resolve_env(&names.password_var),
        sheets_spreadsheet_id: resolve_env(&names.spreadsheet_id_var),
        sheets_api_key: resolve_env(&names.sheets_api_key_var),
    };

    if mode == ConfigMode::Live {
        require(&secrets.storefront_email, mode.as_str(), &names.email_var, "storefront email")?;
        require(
            &secrets.storefront_password,
            mode.as_str(),
            &names.password_var,
            "storefront password",
        )?;
    }

    let source = read_str_at(config_json, "/orders/source").unwrap_or_default();
    if source.eq_ignore_ascii_case("sheets") {
        require(
            &secrets.sheets_spreadsheet_id,
            mode.as_str(),
            &names.spreadsheet_id_var,
            "spreadsheet id",
        )?;
        require(
            &secrets.sheets_api_key,
            mode.as_str(),
            &names.sheets_api_key_var,
            "Sheets api_key",
        )?;
    }

    Ok(secrets)
}
