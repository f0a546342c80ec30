//! Upload manager: selected-file lifecycle and preview handles.
//!
//! A [`PreviewHandle`] is acquired when a file is selected and released when
//! it is dropped. Handles are owned by the [`Selection`] they belong to, so
//! replacing or clearing the selection releases the old handle in the same
//! state transition that installs the new one.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use rand::Rng;
use snapscribe_core::{SelectedFile, SelectionAdvisory};

use crate::error::WorkflowError;
use crate::state::WorkflowState;

/// Local reference to a selected file's bytes, used only for rendering.
#[derive(Debug)]
pub struct PreviewHandle {
    id: String,
    content_type: String,
    bytes: Bytes,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    /// Opaque identifier the view renders from.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared content type of the previewed bytes.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Previewed bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(stage = "upload", action = "preview_release", preview = %self.id);
    }
}

/// Allocates preview handles and counts the live ones.
#[derive(Debug, Clone, Default)]
pub struct PreviewPool {
    live: Arc<AtomicUsize>,
}

impl PreviewPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles not yet released.
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn allocate(&self, file: &SelectedFile) -> PreviewHandle {
        let id = format!("preview-{:016x}", rand::rng().random::<u64>());
        self.live.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(stage = "upload", action = "preview_acquire", preview = %id);
        PreviewHandle {
            id,
            content_type: file.content_type().to_string(),
            bytes: file.bytes().clone(),
            live: Arc::clone(&self.live),
        }
    }
}

/// The current file together with its preview and advisories.
#[derive(Debug)]
pub struct Selection {
    file: SelectedFile,
    preview: PreviewHandle,
    advisories: Vec<SelectionAdvisory>,
}

impl Selection {
    fn new(file: SelectedFile, pool: &PreviewPool) -> Self {
        let preview = pool.allocate(&file);
        let advisories = file.advisories();
        Self {
            file,
            preview,
            advisories,
        }
    }

    /// Selected file.
    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    /// Preview of the selected file.
    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    /// Advisory type/size observations.
    pub fn advisories(&self) -> &[SelectionAdvisory] {
        &self.advisories
    }
}

/// Installs `candidate` as the selection inside one state transition.
///
/// Clears the error and the last result, and bumps the selection generation
/// so in-flight analyses can tell the selection changed under them.
pub(crate) fn replace_selection(
    state: &mut WorkflowState,
    pool: &PreviewPool,
    candidate: Option<SelectedFile>,
) {
    state.error = None;
    state.result = None;
    state.selection_generation += 1;
    // Assigning drops the previous selection, releasing its preview.
    state.selection = candidate.map(|file| Selection::new(file, pool));
}

/// Reads an image from disk into a [`SelectedFile`].
///
/// The content type is derived from the file extension.
///
/// # Errors
/// Returns [`WorkflowError::FileRead`] when the file cannot be read and
/// [`WorkflowError::InvalidFile`] when the path has no file name.
pub async fn load_selected_file(path: &Path) -> Result<SelectedFile, WorkflowError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|error| WorkflowError::FileRead(format!("{}: {error}", path.display())))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(SelectedFile::from_named_bytes(name, data)?)
}
