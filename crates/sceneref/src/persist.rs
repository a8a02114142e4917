//! Encoding and decoding records
//!
//! The stored form always carries `path`, byte-for-byte, including the empty
//! string. The handle is written only when the editor is present and is
//! ignored on load in packaged builds.
//!
//! ```json
//! { "path": "levels/intro", "handle": 3 }
//! ```
//!
//! Decoding happens in the restricted context, so it never reconciles.
//! Editor-side decodes hand the record to a [`DeferredUpdateScheduler`]
//! instead.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::handle::ResourceHandle;
use crate::reconcile::ReconciliationEngine;
use crate::record::{ReferenceRecord, SharedRecord, Tooling};
use crate::scheduler::DeferredUpdateScheduler;
use crate::settings::SceneRefSettings;

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    #[serde(default)]
    path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    handle: Option<ResourceHandle>,
}

/// Reads and writes records for one environment.
#[derive(Debug, Clone, Default)]
pub struct RecordCodec {
    tooling: Tooling,
    scheduler: Option<Arc<DeferredUpdateScheduler>>,
}

impl RecordCodec {
    /// Codec for a packaged build: paths only, nothing deferred.
    pub fn packaged() -> Self {
        Self {
            tooling: Tooling::Packaged,
            scheduler: None,
        }
    }

    /// Codec for the editor; decoded records are queued on `scheduler`.
    pub fn editor(scheduler: Arc<DeferredUpdateScheduler>) -> Self {
        Self {
            tooling: Tooling::Editor,
            scheduler: Some(scheduler),
        }
    }

    /// Codec for the environment named in `settings`.
    ///
    /// `scheduler` is only kept when that environment has handles.
    pub fn from_settings(
        settings: &SceneRefSettings,
        scheduler: Option<Arc<DeferredUpdateScheduler>>,
    ) -> Self {
        Self {
            tooling: settings.tooling,
            scheduler: scheduler.filter(|_| settings.tooling.has_handles()),
        }
    }

    /// Environment this codec reads and writes for.
    pub fn tooling(&self) -> Tooling {
        self.tooling
    }

    /// Stored form of `record` as a JSON value.
    pub fn to_value(&self, record: &ReferenceRecord) -> Result<JsonValue> {
        Ok(serde_json::to_value(self.store(record))?)
    }

    /// Stored form of `record` as a JSON string.
    pub fn encode(&self, record: &ReferenceRecord) -> Result<String> {
        Ok(serde_json::to_string(&self.store(record))?)
    }

    /// Reconcile in the editor, then encode.
    ///
    /// Saving is a privileged operation, so the path written is always the
    /// one the handle currently resolves to.
    pub fn encode_reconciled(
        &self,
        engine: &ReconciliationEngine,
        record: &mut ReferenceRecord,
    ) -> Result<String> {
        if self.tooling.has_handles() {
            engine.reconcile(record);
        }
        self.encode(record)
    }

    /// Rebuild a record from its stored JSON value.
    pub fn from_value(&self, value: JsonValue) -> Result<SharedRecord> {
        let stored: StoredRecord = serde_json::from_value(value)?;
        Ok(self.restore(stored))
    }

    /// Rebuild a record from its stored JSON string.
    pub fn decode(&self, json: &str) -> Result<SharedRecord> {
        let stored: StoredRecord = serde_json::from_str(json)?;
        Ok(self.restore(stored))
    }

    /// Decode `json` into an existing record.
    ///
    /// The record keeps its identity, so decoding the same record twice
    /// before a tick queues it once. The caller must not hold the record's
    /// lock.
    pub fn decode_into(&self, record: &SharedRecord, json: &str) -> Result<()> {
        let stored: StoredRecord = serde_json::from_str(json)?;
        let handle = stored.handle.filter(|_| self.tooling.has_handles());
        record.lock().reload(handle, stored.path);
        if let Some(scheduler) = &self.scheduler {
            scheduler.defer(record);
        }
        Ok(())
    }

    fn store(&self, record: &ReferenceRecord) -> StoredRecord {
        StoredRecord {
            path: record.path().to_string(),
            handle: record.handle().filter(|_| self.tooling.has_handles()),
        }
    }

    fn restore(&self, stored: StoredRecord) -> SharedRecord {
        let record = ReferenceRecord::restore(self.tooling, stored.handle, stored.path).into_shared();
        if let Some(scheduler) = &self.scheduler {
            scheduler.defer(&record);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;

    #[test]
    fn test_packaged_omits_handle() {
        let codec = RecordCodec::packaged();
        let record = ReferenceRecord::packaged("levels/intro");
        assert_eq!(codec.encode(&record).unwrap(), r#"{"path":"levels/intro"}"#);
    }

    #[test]
    fn test_packaged_decode_drops_handle() {
        let codec = RecordCodec::packaged();
        let record = codec.decode(r#"{"path":"levels/intro","handle":4}"#).unwrap();
        let record = record.lock();
        assert_eq!(record.path(), "levels/intro");
        assert_eq!(record.handle(), None);
        assert_eq!(record.tooling(), Tooling::Packaged);
    }

    #[test]
    fn test_empty_path_round_trips() {
        let codec = RecordCodec::packaged();
        let json = codec.encode(&ReferenceRecord::packaged("")).unwrap();
        assert_eq!(codec.decode(&json).unwrap().lock().path(), "");
    }

    #[test]
    fn test_missing_path_decodes_empty() {
        let codec = RecordCodec::packaged();
        assert_eq!(codec.decode("{}").unwrap().lock().path(), "");
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let codec = RecordCodec::packaged();
        assert!(codec.decode("not json").is_err());
        assert!(codec.decode(r#"{"path": 5}"#).is_err());
    }

    #[test]
    fn test_editor_decode_defers_without_reconciling() {
        let scheduler = Arc::new(DeferredUpdateScheduler::new());
        let codec = RecordCodec::editor(scheduler.clone());

        let record = codec.decode(r#"{"path":"old","handle":1}"#).unwrap();
        let id = record.lock().id();
        assert!(scheduler.is_pending(id));
        assert_eq!(record.lock().path(), "old");
    }

    #[test]
    fn test_decode_into_reuses_record() {
        let scheduler = Arc::new(DeferredUpdateScheduler::new());
        let codec = RecordCodec::editor(scheduler.clone());
        let record = ReferenceRecord::new(Tooling::Editor).into_shared();
        let id = record.lock().id();

        codec.decode_into(&record, r#"{"path":"a","handle":1}"#).unwrap();
        codec.decode_into(&record, r#"{"path":"b","handle":2}"#).unwrap();

        let guard = record.lock();
        assert_eq!(guard.id(), id);
        assert_eq!(guard.path(), "b");
        assert_eq!(guard.handle(), Some(ResourceHandle::new(2)));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_decode_into_rejects_malformed_input() {
        let codec = RecordCodec::packaged();
        let record = ReferenceRecord::packaged("levels/intro").into_shared();
        assert!(codec.decode_into(&record, "not json").is_err());
        assert_eq!(record.lock().path(), "levels/intro");
    }

    #[test]
    fn test_from_settings_follows_tooling() {
        let scheduler = Arc::new(DeferredUpdateScheduler::new());
        let packaged = SceneRefSettings {
            tooling: Tooling::Packaged,
            ..Default::default()
        };
        let codec = RecordCodec::from_settings(&packaged, Some(scheduler.clone()));
        assert_eq!(codec.tooling(), Tooling::Packaged);

        let record = codec.decode(r#"{"path":"levels/intro","handle":4}"#).unwrap();
        assert_eq!(record.lock().handle(), None);
        assert!(scheduler.is_empty());

        let codec = RecordCodec::from_settings(&SceneRefSettings::default(), Some(scheduler.clone()));
        assert_eq!(codec.tooling(), Tooling::Editor);
        codec.decode(r#"{"path":"levels/intro","handle":4}"#).unwrap();
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_encode_reconciled_writes_fresh_path() {
        let index = Arc::new(MemoryIndex::new());
        let h = index.insert_scene("a");
        let engine = ReconciliationEngine::new(index.clone());
        let (mut record, _) = engine.record_at("a");
        index.relocate(h, "b").unwrap();

        let codec = RecordCodec::editor(Arc::new(DeferredUpdateScheduler::new()));
        let json = codec.encode_reconciled(&engine, &mut record).unwrap();
        assert_eq!(json, format!(r#"{{"path":"b","handle":{}}}"#, h.raw()));
    }
}
