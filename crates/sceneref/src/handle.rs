//! Identity types: tool-side resource handles and record identities

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Opaque reference to a resource managed by the editing tool's index.
///
/// A handle only means something while the tool is running; packaged
/// builds never see one. The index decides what the number stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(u64);

impl ResourceHandle {
    /// Wrap a raw index identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw index identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:016x}", self.0)
    }
}

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-local identity of a [`ReferenceRecord`](crate::ReferenceRecord).
///
/// Used to key deferred work and unsaved notifications. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

impl RecordId {
    /// Allocate a fresh identity.
    pub fn next() -> Self {
        Self(NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record-{}", self.0)
    }
}
