//! Build manifest membership
//!
//! The build manifest is the ordered list of scene paths that ship in a
//! packaged build. A scene's position in that list is its build index.
//! The manifest is authoritative and may change at any time, so nothing
//! here caches answers.

use indexmap::IndexSet;
use parking_lot::RwLock;

use crate::error::ReferenceWarning;

/// Read interface onto the ordered build manifest.
pub trait BuildManifest: Send + Sync {
    /// Position of `path` in the manifest, if it is listed.
    fn build_index(&self, path: &str) -> Option<usize>;

    /// True when `path` is listed anywhere in the manifest.
    fn contains(&self, path: &str) -> bool {
        self.build_index(path).is_some()
    }
}

/// In-process ordered build manifest.
///
/// Paths are unique; adding a listed path again keeps its original position.
#[derive(Debug, Default)]
pub struct SceneList {
    scenes: RwLock<IndexSet<String>>,
}

impl SceneList {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scene. Returns false if it was already listed.
    pub fn push(&self, path: impl Into<String>) -> bool {
        self.scenes.write().insert(path.into())
    }

    /// Insert a scene at `position`, moving it there if already listed.
    ///
    /// Positions past the end append.
    pub fn insert_at(&self, position: usize, path: impl Into<String>) {
        let mut scenes = self.scenes.write();
        let (current, _) = scenes.insert_full(path.into());
        let target = position.min(scenes.len() - 1);
        scenes.move_index(current, target);
    }

    /// Remove a scene, keeping the order of the rest. Returns false if absent.
    pub fn remove(&self, path: &str) -> bool {
        self.scenes.write().shift_remove(path)
    }

    /// Snapshot of the manifest in build order.
    pub fn paths(&self) -> Vec<String> {
        self.scenes.read().iter().cloned().collect()
    }

    /// Number of listed scenes.
    pub fn len(&self) -> usize {
        self.scenes.read().len()
    }

    /// True when no scene is listed.
    pub fn is_empty(&self) -> bool {
        self.scenes.read().is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SceneList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            scenes: RwLock::new(iter.into_iter().map(Into::into).collect()),
        }
    }
}

impl BuildManifest for SceneList {
    fn build_index(&self, path: &str) -> Option<usize> {
        self.scenes.read().get_index_of(path)
    }
}

/// Answers whether a referenced scene will ship in the build.
#[derive(Clone, Copy)]
pub struct ManifestValidator<'a> {
    manifest: &'a dyn BuildManifest,
}

impl<'a> ManifestValidator<'a> {
    /// Validate against `manifest`.
    pub fn new(manifest: &'a dyn BuildManifest) -> Self {
        Self { manifest }
    }

    /// True iff `path` is currently listed. The empty path never is.
    pub fn is_member(&self, path: &str) -> bool {
        !path.is_empty() && self.manifest.contains(path)
    }

    /// Warning for a resolved path that will not ship, if any.
    pub fn check(&self, path: &str) -> Option<ReferenceWarning> {
        (!self.is_member(path)).then(|| ReferenceWarning::NotManifested {
            path: path.to_string(),
        })
    }
}
