#![warn(missing_docs)]
//! # snapscribe-app
//!
//! ## Purpose
//! Orchestrates session gating, usage sync, file selection, and image analysis
//! for `snapscribe`.
//!
//! ## Responsibilities
//! - Redirect signed-out users once and seed usage once per sign-in.
//! - Keep the usage snapshot in sync with the backend and with analyze echoes.
//! - Own the selected file and its preview handle across replacements.
//! - Run analyses and surface results or errors to the view.
//!
//! ## Data flow
//! Identity status -> session guard -> usage refresh -> file selection ->
//! multipart upload -> result + usage echo -> view projection.
//!
//! ## Ownership and lifetimes
//! [`AnalyzeWorkflow`] owns all mutable state inside a `watch` channel.
//! Collaborators are shared `Arc<dyn Trait>` handles. Preview handles are
//! owned by the selection and released when it is replaced or torn down.
//!
//! ## Error model
//! Operations return [`WorkflowError`] and also write its `Display` text into
//! the error banner. The best-effort refresh after a failed analysis never
//! reports errors.
//!
//! ## Security and privacy notes
//! - Bearer tokens are never logged; error text is passed through
//!   [`redact_sensitive`] before it reaches a log line.
//! - Files are identified in logs by a content fingerprint, never by bytes.
//! - Plain HTTP endpoints are accepted only for loopback hosts.

mod config;
mod error;
mod state;
mod upload;
mod workflow;

pub use config::{
    ConfigError, DEFAULT_API_BASE_URL, ENV_API_BASE_URL, ENV_ENTRY_ROUTE,
    ENV_REQUEST_TIMEOUT_SECS, WorkflowConfig,
};
pub use error::{NO_FILE_SELECTED_MESSAGE, WorkflowError};
pub use state::WorkflowState;
pub use upload::{PreviewHandle, PreviewPool, Selection, load_selected_file};
pub use workflow::{AnalyzeWorkflow, RefreshOutcome};

use tracing_subscriber::EnvFilter;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("SNAPSCRIBE_VERSION");

/// Environment variable holding the tracing filter directive.
pub const ENV_LOG_FILTER: &str = "SNAPSCRIBE_LOG";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

const SECRET_MARKERS: [&str; 4] = ["password", "token", "authorization", "bearer"];

/// Redacts everything from the first secret marker onward.
///
/// Markers are matched case-insensitively; the text after the earliest one is
/// replaced by `<marker>=<redacted>`.
pub fn redact_sensitive(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let earliest = SECRET_MARKERS
        .iter()
        .filter_map(|marker| lower.find(marker).map(|position| (position, *marker)))
        .min_by_key(|(position, _)| *position);

    match earliest {
        Some((position, marker)) => format!("{}{marker}=<redacted>", &input[..position]),
        None => input.to_string(),
    }
}

/// Installs the global `fmt` subscriber filtered by `SNAPSCRIBE_LOG`.
///
/// Defaults to `info` when the variable is unset or invalid.
///
/// # Errors
/// Returns [`ConfigError::Logging`] when a global subscriber is already set.
pub fn init_tracing() -> Result<(), ConfigError> {
    let filter =
        EnvFilter::try_from_env(ENV_LOG_FILTER).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ConfigError::Logging(error.to_string()))
}
