//! Deferring reconciliation out of the restricted context
//!
//! Records are decoded in a context that must not touch the resource index
//! (a background loader, for instance). Decoding only registers the record
//! here; the host calls [`DeferredUpdateScheduler::tick`] from its main loop,
//! which is where reconciliation actually happens.
//!
//! The queue holds weak references. A record dropped before the tick is
//! skipped without complaint, and registering the same record twice before
//! a tick still reconciles it once.

use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::handle::RecordId;
use crate::reconcile::ReconciliationEngine;
use crate::record::{ReferenceRecord, SharedRecord};

/// Summary of one drained tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Records that were reconciled
    pub reconciled: usize,

    /// Of those, records whose path changed
    pub changed: usize,

    /// Registrations whose record no longer existed
    pub skipped: usize,
}

/// One-shot, per-record reconciliation queue.
///
/// Safe to register from any thread. Drained only by [`tick`](Self::tick),
/// which the privileged context owns.
#[derive(Debug, Default)]
pub struct DeferredUpdateScheduler {
    pending: Mutex<IndexMap<RecordId, Weak<Mutex<ReferenceRecord>>>>,
}

impl DeferredUpdateScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `record` for reconciliation on the next tick.
    ///
    /// Returns false when the record was already queued. The caller must not
    /// hold the record's lock.
    pub fn defer(&self, record: &SharedRecord) -> bool {
        let id = record.lock().id();
        let mut pending = self.pending.lock();
        if pending.contains_key(&id) {
            tracing::trace!(record = %id, "reconciliation already pending");
            return false;
        }
        pending.insert(id, Arc::downgrade(record));
        tracing::trace!(record = %id, "reconciliation deferred to next tick");
        true
    }

    /// Drop a pending registration. Returns false if none was queued.
    pub fn cancel(&self, id: RecordId) -> bool {
        self.pending.lock().shift_remove(&id).is_some()
    }

    /// True when `id` is waiting for a tick.
    pub fn is_pending(&self, id: RecordId) -> bool {
        self.pending.lock().contains_key(&id)
    }

    /// Number of queued registrations.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Run every queued reconciliation once, in registration order.
    ///
    /// The queue is emptied before any record is touched, so a record
    /// re-registered during the tick waits for the next one.
    pub fn tick(&self, engine: &ReconciliationEngine) -> TickReport {
        let due: Vec<_> = self.pending.lock().drain(..).collect();
        let mut report = TickReport::default();

        for (id, weak) in due {
            let Some(record) = weak.upgrade() else {
                tracing::trace!(record = %id, "record dropped before tick, skipping");
                report.skipped += 1;
                continue;
            };
            let outcome = engine.reconcile(&mut record.lock());
            report.reconciled += 1;
            if outcome.changed() {
                report.changed += 1;
            }
        }

        if report.reconciled > 0 || report.skipped > 0 {
            tracing::debug!(
                reconciled = report.reconciled,
                changed = report.changed,
                skipped = report.skipped,
                "deferred reconciliation tick"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use crate::record::Tooling;

    fn engine(index: &Arc<MemoryIndex>) -> ReconciliationEngine {
        ReconciliationEngine::new(index.clone())
    }

    #[test]
    fn test_defer_is_idempotent() {
        let scheduler = DeferredUpdateScheduler::new();
        let record = ReferenceRecord::new(Tooling::Editor).into_shared();
        assert!(scheduler.defer(&record));
        assert!(!scheduler.defer(&record));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_tick_runs_once_and_unregisters() {
        let index = Arc::new(MemoryIndex::new());
        let h = index.insert_scene("levels/intro");
        let scheduler = DeferredUpdateScheduler::new();

        let mut record = ReferenceRecord::new(Tooling::Editor);
        record.set_handle(Some(h));
        let record = record.into_shared();
        scheduler.defer(&record);
        scheduler.defer(&record);

        let report = scheduler.tick(&engine(&index));
        assert_eq!(report.reconciled, 1);
        assert_eq!(report.changed, 1);
        assert_eq!(record.lock().path(), "levels/intro");
        assert!(scheduler.is_empty());

        assert_eq!(scheduler.tick(&engine(&index)), TickReport::default());
    }

    #[test]
    fn test_dropped_record_is_skipped() {
        let index = Arc::new(MemoryIndex::new());
        let scheduler = DeferredUpdateScheduler::new();
        let record = ReferenceRecord::new(Tooling::Editor).into_shared();
        scheduler.defer(&record);
        drop(record);

        let report = scheduler.tick(&engine(&index));
        assert_eq!(report.skipped, 1);
        assert_eq!(report.reconciled, 0);
    }

    #[test]
    fn test_cancel_removes_registration() {
        let scheduler = DeferredUpdateScheduler::new();
        let record = ReferenceRecord::new(Tooling::Editor).into_shared();
        let id = record.lock().id();
        scheduler.defer(&record);
        assert!(scheduler.is_pending(id));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.is_pending(id));
        assert!(!scheduler.cancel(id));
    }

    #[test]
    fn test_defer_from_another_thread() {
        let scheduler = Arc::new(DeferredUpdateScheduler::new());
        let record = ReferenceRecord::new(Tooling::Editor).into_shared();

        let worker = {
            let scheduler = scheduler.clone();
            let record = record.clone();
            std::thread::spawn(move || scheduler.defer(&record))
        };
        assert!(worker.join().unwrap());
        assert_eq!(scheduler.len(), 1);
    }
}
