//! # sceneref
//!
//! Durable references to scenes that heal themselves in the editor and keep
//! working once the project is packaged.
//!
//! A [`ReferenceRecord`] stores two things: a live [`ResourceHandle`] that
//! only exists while the editing tool runs, and a plain path string that
//! survives packaging. The [`ReconciliationEngine`] keeps the path in step
//! with wherever the handle points, so moving or renaming a scene does not
//! break references to it.
//!
//! ## Architecture
//!
//! - **Record**: the persisted data, handle optional by environment
//! - **Reconciliation**: re-derives the path from the handle
//! - **Scheduler**: defers reconciliation out of contexts that must not touch
//!   the resource index (decoding on a loader thread)
//! - **Manifest**: checks whether a scene will ship in the build
//! - **Inspector**: glue for an editor panel showing a reference
//!
//! The resource index, build manifest and document persistence are owned by
//! the host and reached through the [`ResourceIndex`], [`BuildManifest`] and
//! [`DocumentSink`] traits. In-memory versions are included.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use sceneref::{MemoryIndex, ReconciliationEngine};
//!
//! let index = Arc::new(MemoryIndex::new());
//! let intro = index.insert_scene("levels/intro");
//! let engine = ReconciliationEngine::new(index.clone());
//!
//! let (mut record, warning) = engine.record_at("levels/intro");
//! assert!(warning.is_none());
//!
//! index.relocate(intro, "levels/prologue").unwrap();
//! assert_eq!(engine.current_path(&mut record), "levels/prologue");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod handle;
pub mod index;
pub mod inspector;
pub mod manifest;
pub mod messages;
pub mod persist;
pub mod reconcile;
pub mod record;
pub mod scheduler;
pub mod settings;

// Re-export main types
pub use document::{DocumentSink, UnsavedTracker};
pub use error::{ReferenceWarning, Result, SceneRefError};
pub use handle::{RecordId, ResourceHandle};
pub use index::{MemoryIndex, ResourceIndex, ResourceKind};
pub use inspector::{InspectorState, ReferenceInspector};
pub use manifest::{BuildManifest, ManifestValidator, SceneList};
pub use messages::{message_for, Diagnostic, Locale};
pub use persist::RecordCodec;
pub use reconcile::{ReconcileOutcome, ReconciliationEngine};
pub use record::{ReferenceRecord, SharedRecord, Tooling};
pub use scheduler::{DeferredUpdateScheduler, TickReport};
pub use settings::{deep_merge, load_settings_from_path, SceneRefSettings};

/// sceneref version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
