//! Unsaved-change notifications to the persistence layer

use indexmap::IndexSet;
use parking_lot::Mutex;

use crate::handle::RecordId;

/// Receives notice that a record's enclosing document needs saving.
///
/// Changing a persisted field is not enough for hosts to notice a document
/// has unsaved edits; reconciliation calls this whenever it rewrites a path.
pub trait DocumentSink: Send + Sync {
    /// The document owning `record` now has unsaved changes.
    fn mark_unsaved(&self, record: RecordId);
}

/// Collects unsaved notifications in arrival order.
#[derive(Debug, Default)]
pub struct UnsavedTracker {
    pending: Mutex<IndexSet<RecordId>>,
}

impl UnsavedTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `record` has been reported and not yet drained.
    pub fn is_unsaved(&self, record: RecordId) -> bool {
        self.pending.lock().contains(&record)
    }

    /// Number of distinct records reported.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// True when nothing is waiting to be saved.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Take every reported record, oldest first.
    pub fn drain(&self) -> Vec<RecordId> {
        self.pending.lock().drain(..).collect()
    }
}

impl DocumentSink for UnsavedTracker {
    fn mark_unsaved(&self, record: RecordId) {
        if self.pending.lock().insert(record) {
            tracing::trace!(%record, "document marked unsaved");
        }
    }
}
