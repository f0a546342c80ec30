#![warn(missing_docs)]
//! # snapscribe-client
//!
//! ## Purpose
//! Talks to the backend's usage and analyze endpoints.
//!
//! ## Responsibilities
//! - Define the [`AnalysisBackend`] seam the workflow controller depends on.
//! - Provide the `reqwest`-based [`HttpBackend`] implementation.
//! - Enforce the API base URL policy (HTTPS, loopback HTTP allowed).
//! - Classify failures for logging ([`classify_backend_error`]).
//!
//! ## Data flow
//! Controller -> [`AnalysisBackend::fetch_usage`] / [`AnalysisBackend::analyze`]
//! -> HTTP request with bearer credential -> decoded
//! [`snapscribe_core::UsageSnapshot`] / [`snapscribe_core::WorkflowResult`]
//! or [`BackendError`].
//!
//! ## Ownership and lifetimes
//! File bytes are shared into the multipart body by reference count; the
//! caller's [`SelectedFile`] stays intact for re-analysis.
//!
//! ## Error model
//! Non-2xx responses become [`BackendError::Rejected`] carrying the final
//! user-facing message. Transport and decode failures keep their reason text.
//!
//! ## Security and privacy notes
//! Tokens are only written into the `Authorization` header; they never appear
//! in errors or logs. A missing token sends no `Authorization` header at all.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use snapscribe_api_contract::{
    FILE_FIELD, Operation, failure_message, parse_analyze_response, parse_usage_response,
};
use snapscribe_core::{SelectedFile, UsageSnapshot, WorkflowResult};
use snapscribe_session::BearerToken;
use thiserror::Error;
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Backend seam used by the workflow controller.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Reads the caller's current quota.
    ///
    /// # Errors
    /// Returns [`BackendError`] on non-2xx, transport or decode failure.
    async fn fetch_usage(&self, token: Option<&BearerToken>) -> Result<UsageSnapshot, BackendError>;

    /// Uploads one image and returns its description with the updated quota.
    ///
    /// # Errors
    /// Returns [`BackendError`] on non-2xx, transport or decode failure.
    async fn analyze(
        &self,
        token: Option<&BearerToken>,
        file: &SelectedFile,
    ) -> Result<WorkflowResult, BackendError>;
}

/// Coarse failure category used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// HTTP 429; the quota is exhausted.
    QuotaExceeded,
    /// HTTP 401/403.
    Unauthorized,
    /// Other 4xx.
    Rejected,
    /// 5xx.
    ServerFault,
    /// Connection, timeout or undecodable response.
    Transport,
}

/// Classifies a backend failure.
pub fn classify_backend_error(error: &BackendError) -> FailureClass {
    match error {
        BackendError::Rejected { status: 429, .. } => FailureClass::QuotaExceeded,
        BackendError::Rejected {
            status: 401 | 403, ..
        } => FailureClass::Unauthorized,
        BackendError::Rejected { status, .. } if *status >= 500 => FailureClass::ServerFault,
        BackendError::Rejected { .. } => FailureClass::Rejected,
        BackendError::Transport { .. }
        | BackendError::InvalidResponse { .. }
        | BackendError::InvalidRequest(_)
        | BackendError::InvalidEndpoint(_) => FailureClass::Transport,
    }
}

/// Validates and normalizes the API base URL.
///
/// # Errors
/// Returns [`BackendError::InvalidEndpoint`] for unparsable URLs, non-HTTP
/// schemes, and plain HTTP to non-loopback hosts.
pub fn validate_api_base_url(raw: &str) -> Result<Url, BackendError> {
    let parsed = Url::parse(raw)
        .map_err(|error| BackendError::InvalidEndpoint(format!("invalid api url: {error}")))?;

    match parsed.scheme() {
        "https" => {}
        "http" if is_loopback_host(&parsed) => {}
        "http" => {
            return Err(BackendError::InvalidEndpoint(
                "api url must use https unless it targets a loopback host".to_string(),
            ));
        }
        other => {
            return Err(BackendError::InvalidEndpoint(format!(
                "unsupported api url scheme: {other}"
            )));
        }
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(BackendError::InvalidEndpoint(
            "api url must not carry a query or fragment".to_string(),
        ));
    }

    Ok(parsed)
}

fn is_loopback_host(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(address)) => address.is_loopback(),
        Some(url::Host::Ipv6(address)) => address.is_loopback(),
        None => false,
    }
}

/// Builds the absolute URL of `operation` under `base`, keeping any base path.
///
/// # Errors
/// Returns [`BackendError::InvalidEndpoint`] when the joined URL is invalid.
pub fn endpoint_url(base: &Url, operation: Operation) -> Result<Url, BackendError> {
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), operation.path());
    Url::parse(&joined)
        .map_err(|error| BackendError::InvalidEndpoint(format!("invalid endpoint url: {error}")))
}

/// `reqwest` implementation of [`AnalysisBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    usage_url: Url,
    analyze_url: Url,
}

impl HttpBackend {
    /// Creates a backend client for a validated base URL.
    ///
    /// # Errors
    /// Returns [`BackendError::InvalidEndpoint`] when the URL violates policy
    /// and [`BackendError::InvalidRequest`] when the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base = validate_api_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| BackendError::InvalidRequest(error.to_string()))?;

        Ok(Self {
            http,
            usage_url: endpoint_url(&base, Operation::FetchUsage)?,
            analyze_url: endpoint_url(&base, Operation::Analyze)?,
        })
    }

    /// Usage endpoint URL.
    pub fn usage_url(&self) -> &Url {
        &self.usage_url
    }

    /// Analyze endpoint URL.
    pub fn analyze_url(&self) -> &Url {
        &self.analyze_url
    }

    async fn execute(
        &self,
        operation: Operation,
        request: reqwest::RequestBuilder,
        token: Option<&BearerToken>,
    ) -> Result<Vec<u8>, BackendError> {
        let request = match token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token.authorization_value()),
            None => request,
        };

        tracing::debug!(
            stage = "backend",
            action = "request",
            operation = operation.label(),
            authenticated = token.is_some()
        );

        let response = request.send().await.map_err(|error| BackendError::Transport {
            operation,
            reason: error.without_url().to_string(),
        })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| BackendError::Transport {
                operation,
                reason: error.without_url().to_string(),
            })?;

        tracing::debug!(
            stage = "backend",
            action = "response",
            operation = operation.label(),
            status = status.as_u16(),
            body_len = body.len()
        );

        if !status.is_success() {
            return Err(BackendError::Rejected {
                operation,
                status: status.as_u16(),
                message: failure_message(operation, status.as_u16(), &body),
            });
        }

        Ok(body.to_vec())
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn fetch_usage(&self, token: Option<&BearerToken>) -> Result<UsageSnapshot, BackendError> {
        let operation = Operation::FetchUsage;
        let body = self
            .execute(operation, self.http.get(self.usage_url.clone()), token)
            .await?;
        parse_usage_response(&body).map_err(|error| BackendError::InvalidResponse {
            operation,
            reason: error.to_string(),
        })
    }

    async fn analyze(
        &self,
        token: Option<&BearerToken>,
        file: &SelectedFile,
    ) -> Result<WorkflowResult, BackendError> {
        let operation = Operation::Analyze;
        let part = Part::stream_with_length(
            reqwest::Body::from(file.bytes().clone()),
            file.len() as u64,
        )
        .file_name(file.name().to_string())
        .mime_str(file.content_type())
        .map_err(|error| BackendError::InvalidRequest(format!("invalid content type: {error}")))?;
        let form = Form::new().part(FILE_FIELD, part);

        let body = self
            .execute(
                operation,
                self.http.post(self.analyze_url.clone()).multipart(form),
                token,
            )
            .await?;
        parse_analyze_response(&body).map_err(|error| BackendError::InvalidResponse {
            operation,
            reason: error.to_string(),
        })
    }
}

/// Backend client errors.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Non-2xx response; `message` is the user-facing text.
    #[error("{message}")]
    Rejected {
        /// Operation that failed.
        operation: Operation,
        /// HTTP status code.
        status: u16,
        /// Server `detail` or status-keyed fallback.
        message: String,
    },
    /// Connection, TLS or timeout failure.
    #[error("{operation} failed: network error ({reason})")]
    Transport {
        /// Operation that failed.
        operation: Operation,
        /// Transport error text.
        reason: String,
    },
    /// 2xx response whose body violated the contract.
    #[error("{operation} failed: unexpected response ({reason})")]
    InvalidResponse {
        /// Operation that failed.
        operation: Operation,
        /// Decode error text.
        reason: String,
    },
    /// Request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Base URL violates policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}
