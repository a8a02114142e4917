//! The editor's resource index
//!
//! The index is owned by the editing tool. This crate only ever asks it two
//! questions: where does a handle live now, and which scene lives at a path.
//! Both must only be asked from the privileged context.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::error::{Result, SceneRefError};
use crate::handle::ResourceHandle;

/// Lookup interface onto the editor's resource database.
pub trait ResourceIndex: Send + Sync {
    /// Current path of the resource behind `handle`.
    ///
    /// `None` when the resource has been deleted or the handle is unknown.
    fn resolve(&self, handle: ResourceHandle) -> Option<String>;

    /// Handle of the scene stored at `path`, if there is one.
    ///
    /// Resources at `path` that are not scenes do not count. When several
    /// scenes share `path`, implementations must pick the same one every time.
    fn acquire(&self, path: &str) -> Option<ResourceHandle>;
}

/// What kind of resource an index entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A scene, the only kind a reference can point at
    Scene,

    /// Anything else the project contains
    Other,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    path: String,
    kind: ResourceKind,
}

/// In-process resource index.
///
/// Backs headless hosts and tests. Safe to edit from any thread; queries
/// always reflect the latest edit. Two scenes may share a path; `acquire`
/// then returns the one registered first.
#[derive(Debug)]
pub struct MemoryIndex {
    entries: DashMap<ResourceHandle, IndexEntry>,
    next_handle: AtomicU64,
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Register a resource and return its handle.
    pub fn insert(&self, path: impl Into<String>, kind: ResourceKind) -> ResourceHandle {
        let handle = ResourceHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.entries.insert(
            handle,
            IndexEntry {
                path: path.into(),
                kind,
            },
        );
        handle
    }

    /// Register a scene and return its handle.
    pub fn insert_scene(&self, path: impl Into<String>) -> ResourceHandle {
        self.insert(path, ResourceKind::Scene)
    }

    /// Move or rename a resource. Its handle stays valid.
    pub fn relocate(&self, handle: ResourceHandle, new_path: impl Into<String>) -> Result<()> {
        let mut entry = self
            .entries
            .get_mut(&handle)
            .ok_or(SceneRefError::UnknownHandle(handle))?;
        let new_path = new_path.into();
        tracing::debug!(%handle, from = %entry.path, to = %new_path, "resource relocated");
        entry.path = new_path;
        Ok(())
    }

    /// Delete a resource. Its handle stops resolving.
    pub fn remove(&self, handle: ResourceHandle) -> Result<()> {
        self.entries
            .remove(&handle)
            .map(|_| ())
            .ok_or(SceneRefError::UnknownHandle(handle))
    }

    /// Number of indexed resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceIndex for MemoryIndex {
    fn resolve(&self, handle: ResourceHandle) -> Option<String> {
        self.entries
            .get(&handle)
            .map(|entry| entry.path.clone())
            .filter(|path| !path.is_empty())
    }

    fn acquire(&self, path: &str) -> Option<ResourceHandle> {
        if path.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .filter(|entry| entry.kind == ResourceKind::Scene && entry.path == path)
            .map(|entry| *entry.key())
            .min()
    }
}
