//! Shared fixtures for app integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use snapscribe_api_contract::Operation;
use snapscribe_app::AnalyzeWorkflow;
use snapscribe_client::{AnalysisBackend, BackendError};
use snapscribe_core::{SelectedFile, Tier, UsageSnapshot, WorkflowResult};
use snapscribe_session::{BearerToken, IdentityProvider, Navigator, SessionError, SessionStatus};
use tokio::sync::Notify;

/// How the fake identity answers token requests.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScript {
    /// Returns `tok-123`.
    Valid,
    /// Returns `Ok(None)`.
    Missing,
    /// Returns a provider error.
    Failing,
}

/// Identity provider with mutable status and scripted token answers.
pub struct FakeIdentity {
    status: Mutex<SessionStatus>,
    token: Mutex<TokenScript>,
}

#[allow(dead_code)]
impl FakeIdentity {
    /// Loaded and signed in with a valid token.
    pub fn signed_in() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(SessionStatus::new(true, true)),
            token: Mutex::new(TokenScript::Valid),
        })
    }

    /// Loaded and signed out.
    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(SessionStatus::new(true, false)),
            token: Mutex::new(TokenScript::Missing),
        })
    }

    /// Sets the reported session flags.
    pub fn set_status(&self, loaded: bool, signed_in: bool) {
        *self.status.lock().expect("status lock") = SessionStatus::new(loaded, signed_in);
    }

    /// Sets how token requests are answered.
    pub fn set_token(&self, script: TokenScript) {
        *self.token.lock().expect("token lock") = script;
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn status(&self) -> SessionStatus {
        *self.status.lock().expect("status lock")
    }

    async fn get_token(&self) -> Result<Option<BearerToken>, SessionError> {
        let script = *self.token.lock().expect("token lock");
        match script {
            TokenScript::Valid => Ok(Some(BearerToken::new("tok-123").expect("token fixture"))),
            TokenScript::Missing => Ok(None),
            TokenScript::Failing => Err(SessionError::TokenUnavailable(
                "identity provider offline".to_string(),
            )),
        }
    }
}

/// Pair of notifications that holds a backend request mid-flight.
#[derive(Default)]
pub struct Gate {
    /// Signalled once the request has started.
    pub started: Notify,
    /// Must be signalled to let the request complete.
    pub release: Notify,
}

/// Backend with queued responses and call counters.
#[derive(Default)]
pub struct FakeBackend {
    usage: Mutex<VecDeque<Result<UsageSnapshot, BackendError>>>,
    analyses: Mutex<VecDeque<Result<WorkflowResult, BackendError>>>,
    usage_calls: AtomicUsize,
    analyze_calls: AtomicUsize,
    analyze_tokens: Mutex<Vec<Option<String>>>,
    uploaded: Mutex<Vec<String>>,
    usage_gate: Mutex<Option<Arc<Gate>>>,
    analyze_gate: Mutex<Option<Arc<Gate>>>,
}

#[allow(dead_code)]
impl FakeBackend {
    /// Backend with nothing queued.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues one usage response.
    pub fn push_usage(&self, response: Result<UsageSnapshot, BackendError>) {
        self.usage.lock().expect("usage lock").push_back(response);
    }

    /// Puts one usage response ahead of everything already queued.
    pub fn seed_usage(&self, usage: UsageSnapshot) {
        self.usage.lock().expect("usage lock").push_front(Ok(usage));
    }

    /// Queues one analyze response.
    pub fn push_analysis(&self, response: Result<WorkflowResult, BackendError>) {
        self.analyses.lock().expect("analysis lock").push_back(response);
    }

    /// Holds the next usage request until the returned gate is released.
    pub fn gate_usage(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.usage_gate.lock().expect("gate lock") = Some(Arc::clone(&gate));
        gate
    }

    /// Holds the next analyze request until the returned gate is released.
    pub fn gate_analysis(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.analyze_gate.lock().expect("gate lock") = Some(Arc::clone(&gate));
        gate
    }

    /// Number of usage requests received.
    pub fn usage_calls(&self) -> usize {
        self.usage_calls.load(Ordering::SeqCst)
    }

    /// Number of analyze requests received.
    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    /// Raw token values sent with each analyze request.
    pub fn analyze_tokens(&self) -> Vec<Option<String>> {
        self.analyze_tokens.lock().expect("tokens lock").clone()
    }

    /// File names uploaded, in order.
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().expect("uploaded lock").clone()
    }
}

#[async_trait]
impl AnalysisBackend for FakeBackend {
    async fn fetch_usage(&self, _token: Option<&BearerToken>) -> Result<UsageSnapshot, BackendError> {
        self.usage_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.usage_gate.lock().expect("gate lock").take();
        if let Some(gate) = gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        self.usage
            .lock()
            .expect("usage lock")
            .pop_front()
            .unwrap_or_else(|| Err(transport(Operation::FetchUsage)))
    }

    async fn analyze(
        &self,
        token: Option<&BearerToken>,
        file: &SelectedFile,
    ) -> Result<WorkflowResult, BackendError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.analyze_tokens
            .lock()
            .expect("tokens lock")
            .push(token.map(|token| token.as_str().to_string()));
        self.uploaded
            .lock()
            .expect("uploaded lock")
            .push(file.name().to_string());
        let gate = self.analyze_gate.lock().expect("gate lock").take();
        if let Some(gate) = gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        self.analyses
            .lock()
            .expect("analysis lock")
            .pop_front()
            .unwrap_or_else(|| Err(transport(Operation::Analyze)))
    }
}

/// Navigator that records every redirect.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingNavigator {
    /// Empty recorder.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Routes navigated to, in order.
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().expect("routes lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, route: &str) {
        self.routes.lock().expect("routes lock").push(route.to_string());
    }
}

/// Controller wired to the given fakes with `/` as entry route.
#[allow(dead_code)]
pub fn workflow(
    identity: &Arc<FakeIdentity>,
    backend: &Arc<FakeBackend>,
    navigator: &Arc<RecordingNavigator>,
) -> AnalyzeWorkflow {
    AnalyzeWorkflow::new(
        Arc::clone(identity) as Arc<dyn IdentityProvider>,
        Arc::clone(backend) as Arc<dyn AnalysisBackend>,
        Arc::clone(navigator) as Arc<dyn Navigator>,
        "/",
    )
}

/// Controller whose session guard is already active.
///
/// The sign-in usage seed consumes `seed`, so the backend has seen one usage
/// request when this returns.
#[allow(dead_code)]
pub async fn active_workflow(
    identity: &Arc<FakeIdentity>,
    backend: &Arc<FakeBackend>,
    navigator: &Arc<RecordingNavigator>,
    seed: UsageSnapshot,
) -> AnalyzeWorkflow {
    backend.seed_usage(seed);
    let workflow = workflow(identity, backend, navigator);
    workflow.sync_session().await;
    assert!(workflow.can_use_workflow(), "session should be active");
    workflow
}

/// Free-tier snapshot.
#[allow(dead_code)]
pub fn free(used: u32) -> UsageSnapshot {
    UsageSnapshot::new(Tier::Free, used, Some(1))
}

/// Premium snapshot.
#[allow(dead_code)]
pub fn premium(used: u32) -> UsageSnapshot {
    UsageSnapshot::new(Tier::Premium, used, None)
}

/// Non-2xx rejection for `operation`.
#[allow(dead_code)]
pub fn rejected(operation: Operation, status: u16, message: &str) -> BackendError {
    BackendError::Rejected {
        operation,
        status,
        message: message.to_string(),
    }
}

/// Transport failure for `operation`.
#[allow(dead_code)]
pub fn transport(operation: Operation) -> BackendError {
    BackendError::Transport {
        operation,
        reason: "connection refused".to_string(),
    }
}

/// Small JPEG-typed file.
#[allow(dead_code)]
pub fn jpeg(name: &str) -> SelectedFile {
    SelectedFile::from_named_bytes(name, vec![0xFF_u8, 0xD8, 0xFF, 0xE0]).expect("jpeg fixture")
}
