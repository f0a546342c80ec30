#![warn(missing_docs)]
//! # snapscribe-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `snapscribe` workspace.
//!
//! ## Responsibilities
//! - Represent the quota snapshot reported by the backend ([`UsageSnapshot`]).
//! - Represent the user's chosen upload ([`SelectedFile`]) and its advisory
//!   type/size checks.
//! - Represent the last successful analysis ([`WorkflowResult`]).
//!
//! ## Data flow
//! The API contract layer decodes wire payloads into [`UsageSnapshot`] values.
//! The upload layer wraps picked bytes into [`SelectedFile`], which the
//! analyze orchestrator sends to the backend and turns into a
//! [`WorkflowResult`].
//!
//! ## Ownership and lifetimes
//! File bytes are held in reference-counted [`Bytes`] so the controller can
//! hand a file to an in-flight request without copying or borrowing from the
//! workflow state.
//!
//! ## Error model
//! Construction failures return [`CoreError`]. Type and size limits are
//! advisory and reported as [`SelectionAdvisory`] values, never as errors.
//!
//! ## Security and privacy notes
//! File bytes are never formatted by `Debug`; logs identify files by
//! [`SelectedFile::fingerprint`].
//!
//! ## Example
//! ```rust
//! use snapscribe_core::{Tier, UsageSnapshot};
//!
//! let usage = UsageSnapshot::new(Tier::Free, 1, None);
//! assert_eq!(usage.limit, Some(1));
//! assert!(usage.limit_reached());
//! ```

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Limit applied to free-tier snapshots that arrive without one.
pub const FREE_TIER_DEFAULT_LIMIT: u32 = 1;

/// Advertised upload ceiling (5MB). Advisory only.
pub const SOFT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Content type used when a file's type cannot be determined.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Quota class of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Limited number of analyses per session.
    Free,
    /// Unlimited analyses.
    Premium,
}

impl Tier {
    /// Wire name of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Premium => "premium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "premium" => Ok(Tier::Premium),
            other => Err(CoreError::UnknownTier(other.to_string())),
        }
    }
}

/// Backend-authoritative quota state at last sync.
///
/// Snapshots are replaced wholesale on every refresh, never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Quota class.
    pub tier: Tier,
    /// Analyses consumed so far.
    pub used: u32,
    /// Allowed analyses; `None` means unlimited.
    pub limit: Option<u32>,
}

impl UsageSnapshot {
    /// Builds a snapshot, defaulting a missing free-tier limit to
    /// [`FREE_TIER_DEFAULT_LIMIT`].
    pub fn new(tier: Tier, used: u32, limit: Option<u32>) -> Self {
        let limit = match (tier, limit) {
            (Tier::Free, None) => Some(FREE_TIER_DEFAULT_LIMIT),
            (_, limit) => limit,
        };
        Self { tier, used, limit }
    }

    /// Ceiling that applies to this snapshot, or `None` when unlimited.
    pub fn effective_limit(&self) -> Option<u32> {
        match self.tier {
            Tier::Free => Some(self.limit.unwrap_or(FREE_TIER_DEFAULT_LIMIT)),
            Tier::Premium => None,
        }
    }

    /// Returns `true` for free-tier snapshots whose usage reached the limit.
    pub fn limit_reached(&self) -> bool {
        match self.effective_limit() {
            Some(limit) => self.used >= limit,
            None => false,
        }
    }
}

/// Image types accepted by the analyze endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/webp`
    Webp,
}

impl ImageMime {
    /// All accepted types, in picker `accept` order.
    pub const ALL: [ImageMime; 3] = [ImageMime::Jpeg, ImageMime::Png, ImageMime::Webp];

    /// MIME string for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Webp => "image/webp",
        }
    }

    /// Parses a declared content type, ignoring parameters and case.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mime| mime.as_str() == essence)
    }

    /// Maps a file extension (with or without the dot) to an accepted type.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension
            .trim_start_matches('.')
            .to_ascii_lowercase()
            .as_str()
        {
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "png" => Some(ImageMime::Png),
            "webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }

    /// Comma-separated list suitable for a file picker `accept` filter.
    pub fn accept_filter() -> String {
        Self::ALL
            .iter()
            .map(ImageMime::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageMime {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::from_content_type(raw).ok_or_else(|| CoreError::UnsupportedMime(raw.to_string()))
    }
}

/// Non-blocking observation about a selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAdvisory {
    /// Declared type is not one of [`ImageMime::ALL`].
    UnsupportedType {
        /// Declared content type.
        content_type: String,
    },
    /// File is larger than [`SOFT_MAX_UPLOAD_BYTES`].
    ExceedsSoftLimit {
        /// File size in bytes.
        size: usize,
        /// Advertised ceiling in bytes.
        limit: usize,
    },
}

impl SelectionAdvisory {
    /// Short user-facing hint.
    pub fn message(&self) -> String {
        match self {
            SelectionAdvisory::UnsupportedType { content_type } => {
                format!("{content_type} is not supported. Use JPG, PNG or WEBP.")
            }
            SelectionAdvisory::ExceedsSoftLimit { limit, .. } => {
                format!("File is larger than {}MB.", limit / (1024 * 1024))
            }
        }
    }
}

/// User-chosen upload: file name, declared type and bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    content_type: String,
    data: Bytes,
}

impl SelectedFile {
    /// Creates a selected file with an explicit content type.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyFileName`] when `name` is blank; the backend
    /// derives the image type from the file name.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::EmptyFileName);
        }

        Ok(Self {
            name,
            content_type: content_type.into(),
            data: data.into(),
        })
    }

    /// Creates a selected file, deriving the content type from the extension.
    ///
    /// Unknown extensions get [`FALLBACK_CONTENT_TYPE`]; the file is still
    /// accepted.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyFileName`] when `name` is blank.
    pub fn from_named_bytes(
        name: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        let content_type = name
            .rsplit_once('.')
            .and_then(|(_, extension)| ImageMime::from_extension(extension))
            .map(|mime| mime.as_str())
            .unwrap_or(FALLBACK_CONTENT_TYPE);
        Self::new(name, content_type, data)
    }

    /// File name as picked.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Accepted image type, if the declared type is one.
    pub fn mime(&self) -> Option<ImageMime> {
        ImageMime::from_content_type(&self.content_type)
    }

    /// Shared handle to the file bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for zero-byte files.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Short SHA-256 digest of the bytes, used to identify files in logs.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.data);
        hex::encode(&digest[..8])
    }

    /// Type/size observations. An empty list means the file looks acceptable.
    pub fn advisories(&self) -> Vec<SelectionAdvisory> {
        let mut advisories = Vec::new();
        if self.mime().is_none() {
            advisories.push(SelectionAdvisory::UnsupportedType {
                content_type: self.content_type.clone(),
            });
        }
        if self.data.len() > SOFT_MAX_UPLOAD_BYTES {
            advisories.push(SelectionAdvisory::ExceedsSoftLimit {
                size: self.data.len(),
                limit: SOFT_MAX_UPLOAD_BYTES,
            });
        }
        advisories
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Outcome of the last successful analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowResult {
    /// Description text, trimmed. May be empty.
    pub description: String,
    /// Usage echoed by the backend alongside the description.
    pub usage: UsageSnapshot,
}

impl WorkflowResult {
    /// Builds a result, trimming surrounding whitespace from `description`.
    pub fn new(description: &str, usage: UsageSnapshot) -> Self {
        Self {
            description: description.trim().to_string(),
            usage,
        }
    }
}

/// Error type for core model construction and parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// File name is required for upload.
    #[error("file name is empty")]
    EmptyFileName,
    /// Tier string is neither `free` nor `premium`.
    #[error("unknown tier: {0}")]
    UnknownTier(String),
    /// Content type is not an accepted image type.
    #[error("unsupported image type: {0}")]
    UnsupportedMime(String),
}
