//! Environment-driven workflow configuration.

use std::time::Duration;

use snapscribe_client::{BackendError, DEFAULT_REQUEST_TIMEOUT, validate_api_base_url};
use snapscribe_session::{DEFAULT_ENTRY_ROUTE, SessionError, validate_entry_route};
use thiserror::Error;
use url::Url;

/// Backend base URL.
pub const ENV_API_BASE_URL: &str = "SNAPSCRIBE_API_BASE_URL";
/// Redirect target for signed-out users.
pub const ENV_ENTRY_ROUTE: &str = "SNAPSCRIBE_ENTRY_ROUTE";
/// Per-request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "SNAPSCRIBE_REQUEST_TIMEOUT_SECS";

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Validated workflow configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Backend base URL; endpoints live under `/api`.
    pub api_base_url: Url,
    /// Route signed-out users are redirected to.
    pub entry_route: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl WorkflowConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a set variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset or blank keys.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a provided value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());

        let api_base_url = value(ENV_API_BASE_URL).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = validate_api_base_url(api_base_url.trim()).map_err(ConfigError::ApiUrl)?;

        let entry_route = value(ENV_ENTRY_ROUTE).unwrap_or_else(|| DEFAULT_ENTRY_ROUTE.to_string());
        let entry_route = entry_route.trim().to_string();
        validate_entry_route(&entry_route).map_err(ConfigError::EntryRoute)?;

        let request_timeout = match value(ENV_REQUEST_TIMEOUT_SECS) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            api_base_url,
            entry_route,
            request_timeout,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(ConfigError::Timeout(raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `SNAPSCRIBE_API_BASE_URL` violates the endpoint policy.
    #[error("SNAPSCRIBE_API_BASE_URL: {0}")]
    ApiUrl(#[source] BackendError),
    /// `SNAPSCRIBE_ENTRY_ROUTE` is not an in-app path.
    #[error("SNAPSCRIBE_ENTRY_ROUTE: {0}")]
    EntryRoute(#[source] SessionError),
    /// `SNAPSCRIBE_REQUEST_TIMEOUT_SECS` is not a positive integer.
    #[error("SNAPSCRIBE_REQUEST_TIMEOUT_SECS: expected positive seconds, got {0:?}")]
    Timeout(String),
    /// Tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}
