//! Scenario: secret literals never live in config.
//!
//! Loading aborts with CONFIG_SECRET_DETECTED when a leaf looks like a key or
//! token, and the error never echoes the value. Env var names are fine.

use cartfill_config::load_layered_yaml_from_strings;

#[test]
fn google_api_key_literal_is_rejected() {
    let yaml = r#"
orders:
  source: sheets
  sheets:
    api_key_env: "AIzaSyTHIS-IS-A-LITERAL-KEY"
"#;
    let err = load_layered_yaml_from_strings(&[yaml]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("CONFIG_SECRET_DETECTED"), "{msg}");
    assert!(msg.contains("/orders/sheets/api_key_env"), "{msg}");
    assert!(!msg.contains("AIzaSy"), "value leaked: {msg}");
}

#[test]
fn secret_in_overlay_is_rejected() {
    let base = "storefront:\n  base_url: https://shop.example\n";
    let overlay = "storefront:\n  token: \"sk-live-abcdefghijkl\"\n";
    let err = load_layered_yaml_from_strings(&[base, overlay]).unwrap_err();
    assert!(err.to_string().contains("CONFIG_SECRET_DETECTED"));
}

#[test]
fn env_var_names_are_accepted() {
    let yaml = r#"
storefront:
  credentials_env:
    email: "CARTFILL_EMAIL"
    password: "CARTFILL_PASSWORD"
orders:
  sheets:
    api_key_env: "CARTFILL_SHEETS_API_KEY"
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    assert_eq!(
        loaded.config_json["storefront"]["credentials_env"]["password"],
        "CARTFILL_PASSWORD"
    );
}
