//! Error and warning types for scene references

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::handle::ResourceHandle;

/// Main error type for sceneref operations.
///
/// These are genuine failures of the surrounding machinery (I/O, malformed
/// input). Conditions that reference bookkeeping tolerates, such as an
/// unresolvable assignment, are reported as [`ReferenceWarning`] instead.
#[derive(Error, Debug)]
pub enum SceneRefError {
    /// A serialized record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The settings file exists but could not be read
    #[error("Failed to read settings from {path}: {source}")]
    SettingsIo {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for the settings schema
    #[error("Invalid settings in {path}: {source}")]
    SettingsParse {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying parse failure
        source: serde_json::Error,
    },

    /// An index edit referred to a handle the index never issued
    #[error("Unknown resource handle: {0}")]
    UnknownHandle(ResourceHandle),
}

/// Result type alias for sceneref operations
pub type Result<T> = std::result::Result<T, SceneRefError>;

/// Non-fatal condition surfaced to callers and the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceWarning {
    /// `set_path` stored a path the resource index has no scene for
    UnresolvedAssignment {
        /// The path that was stored verbatim
        path: String,
    },

    /// The referenced scene resolves but is not part of the build manifest
    NotManifested {
        /// The resolved path missing from the manifest
        path: String,
    },
}

impl ReferenceWarning {
    /// The path the warning is about.
    pub fn path(&self) -> &str {
        match self {
            Self::UnresolvedAssignment { path } | Self::NotManifested { path } => path,
        }
    }
}

impl fmt::Display for ReferenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedAssignment { path } => {
                write!(f, "no scene could be located at '{}'", path)
            }
            Self::NotManifested { path } => {
                write!(f, "scene '{}' is not included in the build manifest", path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_path_accessor() {
        let w = ReferenceWarning::UnresolvedAssignment {
            path: "levels/unknown".into(),
        };
        assert_eq!(w.path(), "levels/unknown");

        let w = ReferenceWarning::NotManifested {
            path: "levels/removed".into(),
        };
        assert_eq!(w.path(), "levels/removed");
    }

    #[test]
    fn test_warning_display() {
        let w = ReferenceWarning::UnresolvedAssignment {
            path: "levels/unknown".into(),
        };
        assert!(w.to_string().contains("levels/unknown"));
    }

    #[test]
    fn test_unknown_handle_display() {
        let err = SceneRefError::UnknownHandle(ResourceHandle::new(7));
        assert!(err.to_string().contains("Unknown resource handle"));
    }
}
