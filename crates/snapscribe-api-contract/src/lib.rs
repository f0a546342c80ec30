#![warn(missing_docs)]
//! # snapscribe-api-contract
//!
//! ## Purpose
//! Defines the backend's usage/analyze response schema and the client-side
//! decoding and failure-message rules.
//!
//! ## Responsibilities
//! - Decode usage and analyze success bodies into core model values.
//! - Extract the optional `detail` message from failure bodies.
//! - Format the status-keyed fallback message when no `detail` is usable.
//!
//! ## Data flow
//! Raw response bytes -> [`parse_usage_response`] / [`parse_analyze_response`]
//! on success, or [`failure_message`] on non-2xx -> controller state.
//!
//! ## Ownership and lifetimes
//! Decoded values are owned so they outlive the transient response buffer.
//!
//! ## Error model
//! Malformed success bodies return [`ContractError`]. Malformed failure bodies
//! are not errors; they simply carry no `detail`.

use std::fmt;

use serde::{Deserialize, Serialize};
use snapscribe_core::{Tier, UsageSnapshot, WorkflowResult};
use thiserror::Error;

/// Path of the usage endpoint, relative to the API base URL.
pub const USAGE_PATH: &str = "/api/usage";

/// Path of the analyze endpoint, relative to the API base URL.
pub const ANALYZE_PATH: &str = "/api/analyze";

/// Multipart field carrying the image bytes.
pub const FILE_FIELD: &str = "file";

/// Success body of `GET /api/usage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageResponse {
    /// Quota class.
    pub tier: Tier,
    /// Analyses consumed.
    pub used: u32,
    /// Allowed analyses; `null` means unlimited.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl UsageResponse {
    /// Converts into a normalized snapshot.
    pub fn into_snapshot(self) -> UsageSnapshot {
        UsageSnapshot::new(self.tier, self.used, self.limit)
    }
}

/// Success body of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Generated description.
    #[serde(default)]
    pub description: String,
    /// Quota class after this analysis.
    pub tier: Tier,
    /// Analyses consumed, including this one.
    pub used: u32,
    /// Allowed analyses; `null` means unlimited.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl AnalyzeResponse {
    /// Usage echoed alongside the description.
    pub fn usage(&self) -> UsageSnapshot {
        UsageSnapshot::new(self.tier, self.used, self.limit)
    }

    /// Converts into a result with a trimmed description.
    pub fn into_result(self) -> WorkflowResult {
        let usage = self.usage();
        WorkflowResult::new(&self.description, usage)
    }
}

/// Failure body convention shared by both endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason. Validation errors may carry non-string values.
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

/// Backend operation, used to key fallback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /api/usage`.
    FetchUsage,
    /// `POST /api/analyze`.
    Analyze,
}

impl Operation {
    /// Label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::FetchUsage => "Usage fetch",
            Operation::Analyze => "Analyze",
        }
    }

    /// Endpoint path for this operation.
    pub fn path(&self) -> &'static str {
        match self {
            Operation::FetchUsage => USAGE_PATH,
            Operation::Analyze => ANALYZE_PATH,
        }
    }

    /// `"<operation> failed (<status>)"`.
    pub fn fallback_message(&self, status: u16) -> String {
        format!("{} failed ({status})", self.label())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decodes a usage success body.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON or missing fields.
pub fn parse_usage_response(raw: &[u8]) -> Result<UsageSnapshot, ContractError> {
    let parsed: UsageResponse = serde_json::from_slice(raw)?;
    Ok(parsed.into_snapshot())
}

/// Decodes an analyze success body.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON or missing usage fields.
pub fn parse_analyze_response(raw: &[u8]) -> Result<WorkflowResult, ContractError> {
    let parsed: AnalyzeResponse = serde_json::from_slice(raw)?;
    Ok(parsed.into_result())
}

/// Returns the failure body's `detail` when it is a non-blank string.
pub fn extract_detail(raw: &[u8]) -> Option<String> {
    let body: ErrorBody = serde_json::from_slice(raw).ok()?;
    match body.detail? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}

/// User-facing message for a non-2xx response.
pub fn failure_message(operation: Operation, status: u16, raw: &[u8]) -> String {
    extract_detail(raw).unwrap_or_else(|| operation.fallback_message(status))
}

/// Contract decoding errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// JSON decode failure.
    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}
