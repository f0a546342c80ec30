//! Integration tests for environment-driven configuration.

use std::collections::HashMap;
use std::time::Duration;

use snapscribe_app::{
    ConfigError, ENV_API_BASE_URL, ENV_ENTRY_ROUTE, ENV_REQUEST_TIMEOUT_SECS, WorkflowConfig,
};

fn load(pairs: &[(&str, &str)]) -> Result<WorkflowConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    WorkflowConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn config_loading_tests_defaults_when_unset() {
    let config = load(&[]).expect("defaults should be valid");

    assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
    assert_eq!(config.entry_route, "/");
    assert_eq!(config.request_timeout, Duration::from_secs(60));
}

#[test]
fn config_loading_tests_blank_values_fall_back_to_defaults() {
    let config = load(&[(ENV_API_BASE_URL, "  "), (ENV_ENTRY_ROUTE, "")])
        .expect("blank values fall back");

    assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
    assert_eq!(config.entry_route, "/");
}

#[test]
fn config_loading_tests_accepts_https_backend_and_custom_route() {
    let config = load(&[
        (ENV_API_BASE_URL, "https://api.snapscribe.test"),
        (ENV_ENTRY_ROUTE, "/welcome"),
        (ENV_REQUEST_TIMEOUT_SECS, "15"),
    ])
    .expect("valid overrides");

    assert_eq!(config.api_base_url.host_str(), Some("api.snapscribe.test"));
    assert_eq!(config.entry_route, "/welcome");
    assert_eq!(config.request_timeout, Duration::from_secs(15));
}

#[test]
fn config_loading_tests_rejects_plain_http_to_remote_host() {
    let error = load(&[(ENV_API_BASE_URL, "http://api.snapscribe.test")])
        .expect_err("remote http is refused");

    assert!(matches!(error, ConfigError::ApiUrl(_)));
    assert!(error.to_string().starts_with(ENV_API_BASE_URL));
}

#[test]
fn config_loading_tests_rejects_external_entry_route() {
    let error = load(&[(ENV_ENTRY_ROUTE, "//evil.test/")]).expect_err("not an in-app path");
    assert!(matches!(error, ConfigError::EntryRoute(_)));
}

#[test]
fn config_loading_tests_rejects_zero_timeout() {
    let error = load(&[(ENV_REQUEST_TIMEOUT_SECS, "0")]).expect_err("zero timeout");
    assert!(matches!(error, ConfigError::Timeout(_)));

    let error = load(&[(ENV_REQUEST_TIMEOUT_SECS, "soon")]).expect_err("not a number");
    assert!(matches!(error, ConfigError::Timeout(_)));
}
