//! Keeping a record's path in step with its handle
//!
//! The engine is the only writer of [`ReferenceRecord::path`]. It runs in the
//! privileged context because every operation may query the resource index.
//!
//! Reconciliation re-derives `path` from `handle`:
//!
//! - no handle: the path is cleared
//! - handle no longer resolves: the last known path is kept, so runtime code
//!   can still load the scene by name after the editor lost track of it
//! - handle resolves somewhere new: the path follows it and the owning
//!   document is reported unsaved
//!
//! Running it again without an index change does nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::document::DocumentSink;
use crate::error::ReferenceWarning;
use crate::handle::ResourceHandle;
use crate::index::ResourceIndex;
use crate::record::{ReferenceRecord, Tooling};
use crate::settings::SceneRefSettings;

/// What a reconciliation pass did to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Path already matched the handle
    Unchanged,

    /// Handle was gone, so the stale path was cleared
    Cleared {
        /// Path before clearing
        previous: String,
    },

    /// Handle resolved to a new path and the record followed it
    Updated {
        /// Path before the update
        previous: String,
        /// Path the handle resolves to now
        current: String,
    },

    /// Handle no longer resolves; the last known path was kept
    Stale,

    /// Packaged record; nothing to reconcile against
    ReadOnly,
}

impl ReconcileOutcome {
    /// True when the pass rewrote the path.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Cleared { .. } | Self::Updated { .. })
    }
}

/// Reconciles scene references against the editor's resource index.
///
/// Clones share the play-mode flag, so a clone handed to an inspector
/// follows the host's play state.
#[derive(Clone)]
pub struct ReconciliationEngine {
    index: Arc<dyn ResourceIndex>,
    sink: Option<Arc<dyn DocumentSink>>,
    tooling: Tooling,
    playing: Arc<AtomicBool>,
}

impl ReconciliationEngine {
    /// Create an engine over `index` with no unsaved-change reporting.
    pub fn new(index: Arc<dyn ResourceIndex>) -> Self {
        Self {
            index,
            sink: None,
            tooling: Tooling::default(),
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create an engine over `index` configured from `settings`.
    pub fn from_settings(index: Arc<dyn ResourceIndex>, settings: &SceneRefSettings) -> Self {
        Self::new(index).with_tooling(settings.tooling)
    }

    /// Report path rewrites to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn DocumentSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Create records for `tooling` instead of the editor.
    pub fn with_tooling(mut self, tooling: Tooling) -> Self {
        self.tooling = tooling;
        self
    }

    /// Environment for records this engine creates.
    pub fn tooling(&self) -> Tooling {
        self.tooling
    }

    /// Enter or leave play mode, for this engine and every clone of it.
    ///
    /// While playing, path rewrites still set the record's dirty flag but
    /// the sink is not notified.
    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Relaxed);
    }

    /// True while in play mode.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    /// The index this engine queries.
    pub fn index(&self) -> &dyn ResourceIndex {
        self.index.as_ref()
    }

    /// Bring `record.path` in line with `record.handle`.
    pub fn reconcile(&self, record: &mut ReferenceRecord) -> ReconcileOutcome {
        if !record.tooling().has_handles() {
            return ReconcileOutcome::ReadOnly;
        }

        let Some(handle) = record.handle() else {
            if record.is_empty() {
                return ReconcileOutcome::Unchanged;
            }
            let previous = record.path().to_string();
            record.write_path(String::new());
            tracing::debug!(record = %record.id(), %previous, "handle cleared, path cleared");
            return ReconcileOutcome::Cleared { previous };
        };

        let current = match self.index.resolve(handle) {
            Some(path) if !path.is_empty() => path,
            _ => {
                tracing::debug!(
                    record = %record.id(),
                    %handle,
                    path = %record.path(),
                    "handle no longer resolves, keeping last known path"
                );
                return ReconcileOutcome::Stale;
            }
        };

        if current == record.path() {
            return ReconcileOutcome::Unchanged;
        }

        let previous = record.path().to_string();
        record.write_path(current.clone());
        record.mark_dirty();
        self.notify_unsaved(record);
        tracing::debug!(record = %record.id(), %previous, %current, "path follows handle");

        ReconcileOutcome::Updated { previous, current }
    }

    /// Replace the handle and reconcile immediately.
    ///
    /// Handle edits come from the privileged context, so there is nothing
    /// to defer.
    pub fn assign_handle(
        &self,
        record: &mut ReferenceRecord,
        handle: Option<ResourceHandle>,
    ) -> ReconcileOutcome {
        record.set_handle(handle);
        self.reconcile(record)
    }

    /// Store `new_path` and re-acquire the matching handle.
    ///
    /// The path is stored verbatim even when the index has no scene there;
    /// in that case the handle is left unset and an
    /// [`UnresolvedAssignment`](ReferenceWarning::UnresolvedAssignment) is
    /// returned. Packaged records are read-only and are left untouched.
    pub fn set_path(
        &self,
        record: &mut ReferenceRecord,
        new_path: impl Into<String>,
    ) -> Option<ReferenceWarning> {
        let new_path = new_path.into();
        if !record.tooling().has_handles() {
            tracing::warn!(record = %record.id(), path = %new_path, "packaged record paths are read-only");
            return None;
        }

        record.write_path(new_path);
        if record.is_empty() {
            record.clear_handle();
            return None;
        }

        // Always a fresh lookup; a cached answer could point at a moved scene.
        match self.index.acquire(record.path()) {
            Some(handle) => {
                record.set_handle(Some(handle));
                None
            }
            None => {
                record.clear_handle();
                tracing::warn!(
                    record = %record.id(),
                    path = %record.path(),
                    "path assigned, but no scene could be located there"
                );
                Some(ReferenceWarning::UnresolvedAssignment {
                    path: record.path().to_string(),
                })
            }
        }
    }

    /// Create a record pointing at `path`.
    ///
    /// Packaged engines store `path` as is, since there is no index to ask.
    pub fn record_at(
        &self,
        path: impl Into<String>,
    ) -> (ReferenceRecord, Option<ReferenceWarning>) {
        if !self.tooling.has_handles() {
            return (ReferenceRecord::packaged(path), None);
        }
        let mut record = ReferenceRecord::new(self.tooling);
        let warning = self.set_path(&mut record, path);
        (record, warning)
    }

    /// Reconcile, then return the up-to-date path.
    pub fn current_path<'r>(&self, record: &'r mut ReferenceRecord) -> &'r str {
        self.reconcile(record);
        record.path()
    }

    /// Copy `record` under a new identity and reconcile the copy.
    pub fn duplicate(&self, record: &ReferenceRecord) -> ReferenceRecord {
        let mut copy = record.fork();
        self.reconcile(&mut copy);
        copy
    }

    fn notify_unsaved(&self, record: &ReferenceRecord) {
        if self.is_playing() {
            return;
        }
        if let Some(sink) = &self.sink {
            sink.mark_unsaved(record.id());
        }
    }
}

impl std::fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("has_sink", &self.sink.is_some())
            .field("tooling", &self.tooling)
            .field("playing", &self.is_playing())
            .finish()
    }
}
