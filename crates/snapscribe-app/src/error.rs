//! Workflow error taxonomy.
//!
//! `Display` output of every variant is the exact text shown in the error
//! banner.

use snapscribe_api_contract::Operation;
use snapscribe_client::BackendError;
use snapscribe_core::CoreError;
use snapscribe_session::SessionError;
use thiserror::Error;

/// Banner text when `analyze` runs without a selected file.
pub const NO_FILE_SELECTED_MESSAGE: &str = "Please choose an image first.";

/// Errors surfaced by workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No token could be obtained from the identity provider.
    #[error("Authentication required: {0}")]
    Auth(#[source] SessionError),
    /// The identity provider has not finished loading; no request is sent.
    #[error("Session is still loading.")]
    SessionLoading,
    /// `analyze` was called without a selected file.
    #[error("Please choose an image first.")]
    NoFileSelected,
    /// `analyze` was called while another analysis is running.
    #[error("An analysis is already running.")]
    AnalyzeInProgress,
    /// Usage endpoint answered non-2xx.
    #[error("{message}")]
    UsageFetch {
        /// HTTP status code.
        status: u16,
        /// Server `detail` or status-keyed fallback.
        message: String,
    },
    /// Analyze endpoint answered non-2xx.
    #[error("{message}")]
    Analyze {
        /// HTTP status code.
        status: u16,
        /// Server `detail` or status-keyed fallback.
        message: String,
    },
    /// Transport failure or undecodable response.
    #[error("{0}")]
    Network(#[source] BackendError),
    /// Image could not be read from disk.
    #[error("Unable to read image: {0}")]
    FileRead(String),
    /// Image could not be wrapped as an upload.
    #[error("Invalid image: {0}")]
    InvalidFile(#[from] CoreError),
}

impl From<BackendError> for WorkflowError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Rejected {
                operation: Operation::FetchUsage,
                status,
                message,
            } => WorkflowError::UsageFetch { status, message },
            BackendError::Rejected {
                operation: Operation::Analyze,
                status,
                message,
            } => WorkflowError::Analyze { status, message },
            other => WorkflowError::Network(other),
        }
    }
}
