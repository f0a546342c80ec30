#![warn(missing_docs)]
//! # snapscribe-session
//!
//! ## Purpose
//! Gates the analyze workflow on the identity provider's session state.
//!
//! ## Responsibilities
//! - Abstract the external identity provider ([`IdentityProvider`]) and the
//!   host's navigation ([`Navigator`]).
//! - Model bearer credentials without leaking them through `Debug`.
//! - Turn session observations into edge-triggered actions with
//!   [`SessionGuard`]: one redirect when signed out, one usage refresh when a
//!   session becomes usable.
//!
//! ## Data flow
//! Host re-renders -> controller reads [`SessionStatus`] ->
//! [`SessionGuard::observe`] -> [`GuardAction`] -> controller redirects or
//! refreshes usage.
//!
//! ## Ownership and lifetimes
//! Tokens are owned `String`s fetched fresh per request and dropped after use;
//! nothing here caches them.
//!
//! ## Error model
//! Token acquisition problems surface as [`SessionError`].
//!
//! ## Security and privacy notes
//! [`BearerToken`] redacts its value in `Debug` output.
//!
//! ## Example
//! ```rust
//! use snapscribe_session::{GuardAction, SessionGuard, SessionStatus};
//!
//! let mut guard = SessionGuard::new("/");
//! assert_eq!(guard.observe(SessionStatus::new(false, false)), GuardAction::None);
//! assert_eq!(guard.observe(SessionStatus::new(true, true)), GuardAction::RefreshUsage);
//! assert_eq!(guard.observe(SessionStatus::new(true, true)), GuardAction::None);
//! ```

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Default route signed-out users are sent to.
pub const DEFAULT_ENTRY_ROUTE: &str = "/";

/// Short-lived proof of authentication attached to backend requests.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token.
    ///
    /// # Errors
    /// Returns [`SessionError::EmptyToken`] for blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        Ok(Self(raw))
    }

    /// Raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value (`Bearer <token>`).
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Session flags read from the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatus {
    /// Provider finished initializing.
    pub loaded: bool,
    /// A user is signed in.
    pub signed_in: bool,
}

impl SessionStatus {
    /// Creates a status snapshot.
    pub fn new(loaded: bool, signed_in: bool) -> Self {
        Self { loaded, signed_in }
    }

    /// `loaded && signed_in`.
    pub fn can_use_workflow(&self) -> bool {
        self.loaded && self.signed_in
    }
}

/// External identity collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current session flags.
    fn status(&self) -> SessionStatus;

    /// Fetches a fresh token; `Ok(None)` when nobody is signed in.
    ///
    /// # Errors
    /// Returns [`SessionError::TokenUnavailable`] when the provider fails.
    async fn get_token(&self) -> Result<Option<BearerToken>, SessionError>;
}

/// Host navigation used for the signed-out redirect.
pub trait Navigator: Send + Sync {
    /// Replaces the current location with `route`.
    fn replace(&self, route: &str);
}

/// Fetches a token, treating an absent one as an error.
///
/// # Errors
/// Returns [`SessionError::SignedOut`] when the provider returns no token and
/// propagates provider failures unchanged.
pub async fn require_token(provider: &dyn IdentityProvider) -> Result<BearerToken, SessionError> {
    provider
        .get_token()
        .await?
        .ok_or(SessionError::SignedOut)
}

/// Where the guard currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    /// Provider not loaded yet; nothing may run.
    Suspended,
    /// Signed out; redirect issued.
    SignedOut,
    /// Signed in; workflow usable.
    Active,
}

/// Side effect requested by [`SessionGuard::observe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    /// Nothing to do.
    None,
    /// Navigate to the entry route.
    Redirect(String),
    /// Seed the quota display.
    RefreshUsage,
}

/// Edge-triggered session gate.
///
/// Repeated observations of the same status never repeat an action, so the
/// guard can be fed on every render.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    entry_route: String,
    phase: GuardPhase,
    redirect_issued: bool,
}

impl SessionGuard {
    /// Creates a suspended guard redirecting to `entry_route`.
    pub fn new(entry_route: impl Into<String>) -> Self {
        Self {
            entry_route: entry_route.into(),
            phase: GuardPhase::Suspended,
            redirect_issued: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> GuardPhase {
        self.phase
    }

    /// Redirect target.
    pub fn entry_route(&self) -> &str {
        &self.entry_route
    }

    /// Returns `true` while the workflow may issue requests.
    pub fn can_use_workflow(&self) -> bool {
        self.phase == GuardPhase::Active
    }

    /// Feeds one status observation and returns the action it triggers.
    pub fn observe(&mut self, status: SessionStatus) -> GuardAction {
        if !status.loaded {
            self.phase = GuardPhase::Suspended;
            return GuardAction::None;
        }

        if !status.signed_in {
            self.phase = GuardPhase::SignedOut;
            if self.redirect_issued {
                return GuardAction::None;
            }
            self.redirect_issued = true;
            return GuardAction::Redirect(self.entry_route.clone());
        }

        self.redirect_issued = false;
        if self.phase == GuardPhase::Active {
            return GuardAction::None;
        }
        self.phase = GuardPhase::Active;
        GuardAction::RefreshUsage
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_ROUTE)
    }
}

/// Validates an in-app route used as redirect target.
///
/// # Errors
/// Returns [`SessionError::InvalidEntryRoute`] unless the route is an
/// absolute path without scheme or host.
pub fn validate_entry_route(route: &str) -> Result<(), SessionError> {
    if !route.starts_with('/') || route.starts_with("//") {
        return Err(SessionError::InvalidEntryRoute(route.to_string()));
    }
    Ok(())
}

/// Identity provider backed by a fixed token, for command-line use.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    token: Option<BearerToken>,
}

impl StaticIdentity {
    /// Signed-in identity when `token` is present, signed-out otherwise.
    pub fn new(token: Option<BearerToken>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn status(&self) -> SessionStatus {
        SessionStatus::new(true, self.token.is_some())
    }

    async fn get_token(&self) -> Result<Option<BearerToken>, SessionError> {
        Ok(self.token.clone())
    }
}

/// Errors produced by session handling.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Token string is blank.
    #[error("token must be non-empty")]
    EmptyToken,
    /// Provider returned no token.
    #[error("not signed in")]
    SignedOut,
    /// Provider failed to produce a token.
    #[error("token unavailable: {0}")]
    TokenUnavailable(String),
    /// Redirect target is not an in-app path.
    #[error("invalid entry route: {0}")]
    InvalidEntryRoute(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for guard transitions and token handling.

    use super::*;

    #[test]
    fn redirects_once_while_signed_out() {
        let mut guard = SessionGuard::new("/");
        let signed_out = SessionStatus::new(true, false);

        assert_eq!(guard.observe(signed_out), GuardAction::Redirect("/".to_string()));
        assert_eq!(guard.observe(signed_out), GuardAction::None);
        assert_eq!(guard.phase(), GuardPhase::SignedOut);
    }

    #[test]
    fn sign_in_edge_triggers_single_refresh() {
        let mut guard = SessionGuard::default();
        assert_eq!(guard.observe(SessionStatus::new(true, false)), GuardAction::Redirect("/".to_string()));
        assert_eq!(guard.observe(SessionStatus::new(true, true)), GuardAction::RefreshUsage);
        assert_eq!(guard.observe(SessionStatus::new(true, true)), GuardAction::None);
        assert!(guard.can_use_workflow());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = BearerToken::new("secret-value").expect("token should build");
        assert!(!format!("{token:?}").contains("secret-value"));
        assert_eq!(token.authorization_value(), "Bearer secret-value");
    }

    #[test]
    fn entry_route_must_be_local_path() {
        validate_entry_route("/").expect("root route should pass");
        assert!(validate_entry_route("https://evil.test/").is_err());
        assert!(validate_entry_route("//evil.test").is_err());
    }
}
