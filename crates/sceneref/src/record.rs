//! The persisted scene reference

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::handle::{RecordId, ResourceHandle};

/// Whether the editing tool is present in the current process.
///
/// Decides if a record may carry a live handle at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tooling {
    /// The editing tool and its resource index are available
    #[default]
    Editor,

    /// A packaged build: no index, no handles, paths are read-only
    Packaged,
}

impl Tooling {
    /// True when live handles exist in this environment.
    pub fn has_handles(self) -> bool {
        self == Tooling::Editor
    }
}

/// A durable reference to a scene.
///
/// `path` is what survives packaging and is used to load the scene at
/// runtime. `handle` is the editor's live link to the resource and is what
/// keeps `path` correct across moves and renames. Only the
/// [`ReconciliationEngine`](crate::ReconciliationEngine) writes `path`.
///
/// Not `Clone`: every record has its own identity. Use
/// [`ReconciliationEngine::duplicate`](crate::ReconciliationEngine::duplicate).
#[derive(Debug)]
pub struct ReferenceRecord {
    id: RecordId,
    tooling: Tooling,
    handle: Option<ResourceHandle>,
    path: String,
    dirty: bool,
}

/// A record shared between its owning document and the deferred scheduler.
pub type SharedRecord = Arc<Mutex<ReferenceRecord>>;

impl ReferenceRecord {
    /// Create an empty record for the given environment.
    pub fn new(tooling: Tooling) -> Self {
        Self {
            id: RecordId::next(),
            tooling,
            handle: None,
            path: String::new(),
            dirty: false,
        }
    }

    /// Create a read-only record for a packaged build.
    pub fn packaged(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::new(Tooling::Packaged)
        }
    }

    /// Rebuild a record from its persisted parts.
    ///
    /// The handle is dropped when `tooling` has no handles.
    pub(crate) fn restore(
        tooling: Tooling,
        handle: Option<ResourceHandle>,
        path: String,
    ) -> Self {
        Self {
            handle: handle.filter(|_| tooling.has_handles()),
            path,
            ..Self::new(tooling)
        }
    }

    /// Overwrite the persisted parts in place, keeping the identity.
    ///
    /// The handle is dropped when this record has no handles.
    pub(crate) fn reload(&mut self, handle: Option<ResourceHandle>, path: String) {
        self.handle = handle.filter(|_| self.tooling.has_handles());
        self.path = path;
    }

    /// Wrap the record for sharing with a scheduler.
    pub fn into_shared(self) -> SharedRecord {
        Arc::new(Mutex::new(self))
    }

    /// Process-local identity of this record.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Environment this record lives in.
    pub fn tooling(&self) -> Tooling {
        self.tooling
    }

    /// The live handle, if any.
    pub fn handle(&self) -> Option<ResourceHandle> {
        self.handle
    }

    /// Point the record at a different resource, or clear it with `None`.
    ///
    /// This is the external edit. It does not touch `path`; run
    /// reconciliation afterwards. Ignored in packaged builds.
    pub fn set_handle(&mut self, handle: Option<ResourceHandle>) {
        if !self.tooling.has_handles() {
            tracing::warn!(record = %self.id, "ignoring handle edit on a packaged record");
            return;
        }
        self.handle = handle;
    }

    /// The runtime-resolvable path. Empty means "no scene".
    ///
    /// This is the stored value; use
    /// [`ReconciliationEngine::current_path`](crate::ReconciliationEngine::current_path)
    /// to get a freshly reconciled one in the editor.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when no scene is referenced.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Scene name: the file name of `path` without its extension.
    pub fn name(&self) -> &str {
        Path::new(&self.path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("")
    }

    /// True when reconciliation changed `path` since the flag was last taken.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn write_path(&mut self, path: String) {
        self.path = path;
    }

    pub(crate) fn clear_handle(&mut self) {
        self.handle = None;
    }

    pub(crate) fn mark_dirty(&mut self) {
        if self.tooling.has_handles() {
            self.dirty = true;
        }
    }

    /// Copy of this record under a new identity.
    pub(crate) fn fork(&self) -> Self {
        Self {
            id: RecordId::next(),
            tooling: self.tooling,
            handle: self.handle,
            path: self.path.clone(),
            dirty: false,
        }
    }
}

impl Default for ReferenceRecord {
    fn default() -> Self {
        Self::new(Tooling::default())
    }
}

impl fmt::Display for ReferenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
