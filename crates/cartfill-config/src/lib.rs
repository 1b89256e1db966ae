//! Layered YAML configuration.
//!
//! YAML docs are merged in order (later docs override), converted to JSON,
//! checked for secret literals, canonicalized and hashed. Secrets are never
//! stored in YAML: the config names the env vars that hold them
//! (see [`secrets`]). [`settings::RunSettings`] is the typed view the CLI
//! consumes, and [`consumption`] reports keys no code reads.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

pub mod consumption;
pub mod secrets;
pub mod settings;

pub use consumption::{
    consumed_pointers_for_mode, report_unused_keys, UnusedKeyPolicy, UnusedKeyReport,
};
pub use settings::{OrderSourceSettings, RunSettings, RuntimeSettings, StorefrontSettings};

/// Known secret-like prefixes. If any leaf string value in the effective
/// config starts with one of these, loading aborts with CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",        // OpenAI style
    "sk_live",    // Stripe live
    "sk_test",    // Stripe test
    "AKIA",       // AWS access key ID
    "AIza",       // Google API key
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "glpat-",     // GitLab PAT
    "xoxb-",      // Slack bot token
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMode {
    /// HTTP storefront, real cart.
    Live,
    /// Fixture catalog, in-memory basket.
    Paper,
}

impl ConfigMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigMode::Live => "LIVE",
            ConfigMode::Paper => "PAPER",
        }
    }

    /// Case-insensitive.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LIVE" => Ok(ConfigMode::Live),
            "PAPER" => Ok(ConfigMode::Paper),
            other => bail!("CONFIG_UNKNOWN_MODE: '{}'; expected one of: LIVE | PAPER", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json::Map is key-sorted (no preserve_order), so compact output is
    // canonical for a given merged document.
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    consumption::collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(Value::as_str) {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_docs_override_earlier() {
        let loaded = load_layered_yaml_from_strings(&[
            "runtime:\n  mode: PAPER\n  cooldown_ms: 1000\n",
            "runtime:\n  mode: LIVE\n",
        ])
        .unwrap();
        assert_eq!(loaded.config_json["runtime"]["mode"], "LIVE");
        assert_eq!(loaded.config_json["runtime"]["cooldown_ms"], 1000);
    }

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!(ConfigMode::parse(" live ").unwrap(), ConfigMode::Live);
        assert_eq!(ConfigMode::parse("Paper").unwrap(), ConfigMode::Paper);
        assert!(ConfigMode::parse("backtest").is_err());
    }

    #[test]
    fn short_strings_are_not_secrets() {
        assert!(!looks_like_secret("sk-1"));
        assert!(looks_like_secret("AIzaSyD-not-a-real-key"));
    }
}
