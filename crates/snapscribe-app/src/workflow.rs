//! Analyze workflow controller.
//!
//! All state lives in one `watch` channel. Every transition is a single
//! `send_modify`/`send_if_modified` closure, so subscribers only ever observe
//! complete transitions. No lock is held across an `.await`.

use std::sync::{Arc, Mutex, PoisonError};

use snapscribe_client::{AnalysisBackend, classify_backend_error};
use snapscribe_core::{SelectedFile, UsageSnapshot, WorkflowResult};
use snapscribe_session::{
    BearerToken, GuardAction, GuardPhase, IdentityProvider, Navigator, SessionError,
    SessionGuard, require_token,
};
use snapscribe_ui::ViewModel;
use tokio::sync::watch;

use crate::error::WorkflowError;
use crate::redact_sensitive;
use crate::state::WorkflowState;
use crate::upload::{PreviewPool, replace_selection};

/// What a usage refresh did with its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched snapshot replaced the previous one.
    Applied(UsageSnapshot),
    /// Another refresh was already in flight; no request was sent.
    Coalesced,
    /// Usage was written by a newer operation while this one was in flight;
    /// the fetched snapshot was discarded.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshMode {
    /// Clears and sets the error banner.
    Foreground,
    /// Never touches the error banner.
    BestEffort,
}

/// Client-resident controller for one signed-in analyze session.
pub struct AnalyzeWorkflow {
    identity: Arc<dyn IdentityProvider>,
    backend: Arc<dyn AnalysisBackend>,
    navigator: Arc<dyn Navigator>,
    guard: Mutex<SessionGuard>,
    previews: PreviewPool,
    state: watch::Sender<WorkflowState>,
}

impl AnalyzeWorkflow {
    /// Creates a controller with empty state and a suspended session guard.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        backend: Arc<dyn AnalysisBackend>,
        navigator: Arc<dyn Navigator>,
        entry_route: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(WorkflowState::default());
        Self {
            identity,
            backend,
            navigator,
            guard: Mutex::new(SessionGuard::new(entry_route)),
            previews: PreviewPool::new(),
            state,
        }
    }

    /// Receiver notified after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    /// Runs `read` against the current state.
    ///
    /// `read` must not block; the state is locked while it runs.
    pub fn inspect<R>(&self, read: impl FnOnce(&WorkflowState) -> R) -> R {
        read(&self.state.borrow())
    }

    /// Projects the current view model.
    pub fn view(&self) -> ViewModel {
        self.inspect(WorkflowState::view)
    }

    /// Number of preview handles currently alive.
    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    /// Current session guard phase.
    pub fn session_phase(&self) -> GuardPhase {
        self.lock_guard().phase()
    }

    /// Returns `true` while the session guard allows backend requests.
    pub fn can_use_workflow(&self) -> bool {
        self.lock_guard().can_use_workflow()
    }

    fn lock_guard(&self) -> std::sync::MutexGuard<'_, SessionGuard> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_session_active(&self) -> Result<(), WorkflowError> {
        match self.session_phase() {
            GuardPhase::Active => Ok(()),
            GuardPhase::Suspended => Err(WorkflowError::SessionLoading),
            GuardPhase::SignedOut => Err(WorkflowError::Auth(SessionError::SignedOut)),
        }
    }

    /// Feeds the identity provider's current status to the session guard and
    /// performs the resulting action.
    ///
    /// Safe to call on every render: the redirect and the usage seed only
    /// happen on the transition edge.
    pub async fn sync_session(&self) -> GuardAction {
        let status = self.identity.status();
        let action = self.lock_guard().observe(status);

        match &action {
            GuardAction::Redirect(route) => {
                tracing::info!(stage = "session", action = "redirect", route = %route);
                self.navigator.replace(route);
            }
            GuardAction::RefreshUsage => {
                tracing::info!(stage = "session", action = "signed_in");
                // Failures are already recorded in the error banner.
                let _ = self.refresh_usage().await;
            }
            GuardAction::None => {}
        }

        action
    }

    /// Fetches the current quota and replaces the usage snapshot.
    ///
    /// Refused without touching state unless the session guard is active.
    /// Clears the error banner when the request starts and records any failure
    /// in it; the previous snapshot is kept on failure. `loading_usage` is set
    /// for the duration and cleared on every exit path.
    ///
    /// # Errors
    /// Returns [`WorkflowError::SessionLoading`] or [`WorkflowError::Auth`]
    /// while the session is not active or no token is available,
    /// [`WorkflowError::UsageFetch`] on non-2xx and [`WorkflowError::Network`]
    /// on transport failure. The same message is already in the banner.
    pub async fn refresh_usage(&self) -> Result<RefreshOutcome, WorkflowError> {
        self.run_refresh(RefreshMode::Foreground).await
    }

    /// Usage refresh whose result is discarded by contract.
    ///
    /// Used to resynchronize the quota display after a failed analysis. It
    /// never clears or sets the error banner and never reports failure. When
    /// another refresh is in flight it waits for that one to settle and then
    /// issues its own, so the quota read always postdates the call.
    pub async fn refresh_usage_best_effort(&self) {
        let mut outcome = self.run_refresh(RefreshMode::BestEffort).await;
        if let Ok(RefreshOutcome::Coalesced) = outcome {
            let mut receiver = self.state.subscribe();
            // Errors only once the sender is dropped.
            let _ = receiver.wait_for(|state| !state.loading_usage).await;
            outcome = self.run_refresh(RefreshMode::BestEffort).await;
        }

        match outcome {
            Ok(outcome) => {
                tracing::debug!(stage = "usage", action = "best_effort_refresh", outcome = ?outcome);
            }
            Err(error) => {
                tracing::debug!(
                    stage = "usage",
                    action = "best_effort_refresh_failed",
                    reason = %redact_sensitive(&error.to_string())
                );
            }
        }
    }

    async fn run_refresh(&self, mode: RefreshMode) -> Result<RefreshOutcome, WorkflowError> {
        if let Err(error) = self.ensure_session_active() {
            tracing::debug!(stage = "usage", action = "refresh_refused", reason = %error);
            return Err(error);
        }

        let mut epoch = 0;
        let started = self.state.send_if_modified(|state| {
            if state.loading_usage {
                return false;
            }
            state.loading_usage = true;
            if mode == RefreshMode::Foreground {
                state.error = None;
            }
            epoch = state.usage_epoch;
            true
        });
        if !started {
            tracing::debug!(stage = "usage", action = "refresh_coalesced");
            return Ok(RefreshOutcome::Coalesced);
        }

        let fetched = self.fetch_usage().await;

        let mut outcome = Ok(RefreshOutcome::Superseded);
        self.state.send_modify(|state| {
            state.loading_usage = false;
            outcome = match fetched {
                Ok(usage) if state.usage_epoch == epoch => {
                    state.usage = Some(usage);
                    state.usage_epoch += 1;
                    Ok(RefreshOutcome::Applied(usage))
                }
                Ok(_) => Ok(RefreshOutcome::Superseded),
                Err(error) => {
                    if mode == RefreshMode::Foreground {
                        state.error = Some(error.to_string());
                    }
                    Err(error)
                }
            };
        });

        match &outcome {
            Ok(RefreshOutcome::Applied(usage)) => tracing::info!(
                stage = "usage",
                action = "refreshed",
                tier = %usage.tier,
                used = usage.used,
                limit = ?usage.limit
            ),
            Ok(_) => tracing::debug!(stage = "usage", action = "refresh_superseded"),
            Err(error) if mode == RefreshMode::Foreground => tracing::warn!(
                stage = "usage",
                action = "refresh_failed",
                reason = %redact_sensitive(&error.to_string())
            ),
            Err(_) => {}
        }

        outcome
    }

    async fn fetch_usage(&self) -> Result<UsageSnapshot, WorkflowError> {
        let token = require_token(self.identity.as_ref())
            .await
            .map_err(WorkflowError::Auth)?;
        Ok(self.backend.fetch_usage(Some(&token)).await?)
    }

    /// Replaces the selected file. `None` clears the selection.
    ///
    /// Clears the error banner and the last result, releases the previous
    /// preview and acquires one for `candidate`, all in one transition. Type
    /// and size are not enforced; advisories are exposed to the view.
    pub fn select_file(&self, candidate: Option<SelectedFile>) {
        match &candidate {
            Some(file) => {
                let advisories = file.advisories();
                tracing::info!(
                    stage = "upload",
                    action = "select",
                    file = %file.fingerprint(),
                    content_type = file.content_type(),
                    size = file.len(),
                    advisories = advisories.len()
                );
                for advisory in &advisories {
                    tracing::warn!(stage = "upload", action = "advisory", detail = %advisory.message());
                }
            }
            None => tracing::info!(stage = "upload", action = "clear"),
        }

        self.state
            .send_modify(|state| replace_selection(state, &self.previews, candidate));
    }

    /// Uploads the selected file for analysis.
    ///
    /// Starting clears the error banner and the previous result. On success
    /// the description and the echoed usage are written in one transition. On
    /// failure the error banner is set and one best-effort usage refresh runs
    /// before `analyzing` is cleared. A missing token does not stop the
    /// request; the backend decides.
    ///
    /// # Errors
    /// Returns [`WorkflowError::SessionLoading`] or [`WorkflowError::Auth`]
    /// without touching state while the session is not active,
    /// [`WorkflowError::NoFileSelected`] without any network call when
    /// nothing is selected, [`WorkflowError::AnalyzeInProgress`] when another
    /// analysis is running, and [`WorkflowError::Analyze`] /
    /// [`WorkflowError::Network`] for backend failures.
    pub async fn analyze(&self) -> Result<WorkflowResult, WorkflowError> {
        if let Err(error) = self.ensure_session_active() {
            tracing::info!(stage = "analyze", action = "refused", reason = %error);
            return Err(error);
        }

        let mut prepared = Err(WorkflowError::NoFileSelected);
        self.state.send_if_modified(|state| {
            if state.analyzing {
                prepared = Err(WorkflowError::AnalyzeInProgress);
                return false;
            }
            state.error = None;
            state.result = None;
            match &state.selection {
                Some(selection) => {
                    state.analyzing = true;
                    prepared = Ok((selection.file().clone(), state.selection_generation));
                }
                None => state.error = Some(WorkflowError::NoFileSelected.to_string()),
            }
            true
        });

        let (file, generation) = match prepared {
            Ok(prepared) => prepared,
            Err(error) => {
                tracing::info!(stage = "analyze", action = "refused", reason = %error);
                return Err(error);
            }
        };

        tracing::info!(
            stage = "analyze",
            action = "start",
            file = %file.fingerprint(),
            size = file.len()
        );
        let token = self.token_or_none().await;

        match self.backend.analyze(token.as_ref(), &file).await {
            Ok(result) => {
                let mut attached = false;
                self.state.send_modify(|state| {
                    state.analyzing = false;
                    state.usage = Some(result.usage);
                    state.usage_epoch += 1;
                    if state.selection_generation == generation {
                        state.result = Some(result.clone());
                        attached = true;
                    }
                });
                tracing::info!(
                    stage = "analyze",
                    action = "complete",
                    file = %file.fingerprint(),
                    used = result.usage.used,
                    description_len = result.description.len(),
                    attached
                );
                Ok(result)
            }
            Err(error) => {
                let class = classify_backend_error(&error);
                let error = WorkflowError::from(error);
                self.state
                    .send_modify(|state| state.error = Some(error.to_string()));
                tracing::warn!(
                    stage = "analyze",
                    action = "failed",
                    class = ?class,
                    reason = %redact_sensitive(&error.to_string())
                );

                self.refresh_usage_best_effort().await;
                self.state.send_modify(|state| state.analyzing = false);
                Err(error)
            }
        }
    }

    async fn token_or_none(&self) -> Option<BearerToken> {
        match self.identity.get_token().await {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                tracing::warn!(stage = "analyze", action = "token_missing");
                None
            }
            Err(error) => {
                tracing::warn!(
                    stage = "analyze",
                    action = "token_failed",
                    reason = %redact_sensitive(&error.to_string())
                );
                None
            }
        }
    }

    /// Releases the selection and its preview and clears the last result.
    pub fn teardown(&self) {
        self.state.send_modify(|state| {
            state.selection = None;
            state.result = None;
            state.selection_generation += 1;
        });
        tracing::debug!(stage = "upload", action = "teardown");
    }
}

impl Drop for AnalyzeWorkflow {
    fn drop(&mut self) {
        // Receivers may keep the state alive; release the preview regardless.
        self.teardown();
    }
}
