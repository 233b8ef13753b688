// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Hublink configuration system.

use hublink_config::diagnostic::suggest_key;
use hublink_config::model::HublinkConfig;
use hublink_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_hublink_config() {
    let toml = r#"
[backend]
base_url = "https://cs.acme.test"
request_timeout_secs = 10

[user]
id = "u-42"

[oauth]
callback_host = "localhost"
callback_port = 4000

[cli]
log_level = "debug"
history_limit = 50
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.backend.base_url, "https://cs.acme.test");
    assert_eq!(config.backend.request_timeout_secs, 10);
    assert_eq!(config.user.id, "u-42");
    assert_eq!(config.oauth.callback_host, "localhost");
    assert_eq!(config.oauth.callback_port, 4000);
    assert_eq!(config.cli.log_level, "debug");
    assert_eq!(config.cli.history_limit, 50);
}

/// Unknown field in [backend] section produces an error.
#[test]
fn unknown_field_in_backend_produces_error() {
    let toml = r#"
[backend]
base_ulr = "https://x"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("base_ulr"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.backend.base_url, "http://localhost:3001");
    assert_eq!(config.backend.request_timeout_secs, 30);
    assert_eq!(config.user.id, "demo");
    assert_eq!(config.oauth.callback_host, "127.0.0.1");
    assert_eq!(config.oauth.callback_port, 3978);
    assert_eq!(config.cli.log_level, "info");
    assert_eq!(config.cli.history_limit, 20);
}

/// Environment variable style override maps through dot notation
/// (HUBLINK_BACKEND_BASE_URL -> backend.base_url, not backend.base.url).
#[test]
fn env_override_maps_to_backend_base_url() {
    use figment::{providers::Serialized, Figment};

    let config: HublinkConfig = Figment::new()
        .merge(Serialized::defaults(HublinkConfig::default()))
        .merge(("backend.base_url", "https://from-env.test"))
        .extract()
        .expect("should merge env override");

    assert_eq!(config.backend.base_url, "https://from-env.test");
}

/// Validation runs after deserialization and reports all problems.
#[test]
fn invalid_values_fail_validation_with_messages() {
    let toml = r#"
[backend]
base_url = "nonsense"

[cli]
history_limit = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors.len() >= 2);
}

/// Typo suggestions surface for misspelled keys.
#[test]
fn typo_suggestion_for_misspelled_key() {
    let valid = &["base_url", "request_timeout_secs"];
    assert_eq!(suggest_key("bse_url", valid), Some("base_url".to_string()));
}

/// A valid config string passes the full load-and-validate path.
#[test]
fn load_and_validate_str_accepts_good_config() {
    let toml = r#"
[backend]
base_url = "http://127.0.0.1:3001"
"#;
    let config = load_and_validate_str(toml).expect("should validate");
    assert_eq!(config.backend.base_url, "http://127.0.0.1:3001");
}
