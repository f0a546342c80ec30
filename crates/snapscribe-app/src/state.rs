//! Workflow state owned by one controller instance.
//!
//! Fields are written only by the controller's transition functions; the view
//! reads them through the accessors below.

use snapscribe_core::{SelectedFile, SelectionAdvisory, UsageSnapshot, WorkflowResult};
use snapscribe_ui::{ProjectionInput, ViewModel, project};

use crate::upload::{PreviewHandle, Selection};

/// Complete controller state.
#[derive(Debug, Default)]
pub struct WorkflowState {
    pub(crate) usage: Option<UsageSnapshot>,
    pub(crate) loading_usage: bool,
    pub(crate) analyzing: bool,
    pub(crate) selection: Option<Selection>,
    pub(crate) result: Option<WorkflowResult>,
    pub(crate) error: Option<String>,
    /// Bumped on every usage write; stale refreshes compare against it.
    pub(crate) usage_epoch: u64,
    /// Bumped on every selection change.
    pub(crate) selection_generation: u64,
}

impl WorkflowState {
    /// Last synced quota.
    pub fn usage(&self) -> Option<&UsageSnapshot> {
        self.usage.as_ref()
    }

    /// Usage refresh in flight.
    pub fn loading_usage(&self) -> bool {
        self.loading_usage
    }

    /// Analyze request in flight.
    pub fn analyzing(&self) -> bool {
        self.analyzing
    }

    /// Selected file, if any.
    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selection.as_ref().map(Selection::file)
    }

    /// Preview of the selected file, if any.
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.selection.as_ref().map(Selection::preview)
    }

    /// Advisory observations about the selected file.
    pub fn advisories(&self) -> &[SelectionAdvisory] {
        self.selection
            .as_ref()
            .map(Selection::advisories)
            .unwrap_or_default()
    }

    /// Last successful analysis.
    pub fn result(&self) -> Option<&WorkflowResult> {
        self.result.as_ref()
    }

    /// Current error banner text.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Projects the view model for this state.
    pub fn view(&self) -> ViewModel {
        project(&ProjectionInput {
            usage: self.usage(),
            loading_usage: self.loading_usage,
            analyzing: self.analyzing,
            has_file: self.selection.is_some(),
            has_preview: self.preview().is_some(),
            result: self.result(),
            error: self.error(),
            advisories: self.advisories(),
        })
    }
}
