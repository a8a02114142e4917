//! Inspector-side glue for editing a reference
//!
//! A visual inspector shows the handle as an editable field and a warning
//! box underneath. [`ReferenceInspector`] is everything such a panel needs
//! from this crate: it routes edits through the engine and tells the panel
//! whether to show a warning. Layout and rendering stay with the host.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ReferenceWarning;
use crate::handle::ResourceHandle;
use crate::manifest::{BuildManifest, ManifestValidator};
use crate::messages::{Diagnostic, Locale};
use crate::reconcile::ReconciliationEngine;
use crate::record::ReferenceRecord;
use crate::settings::SceneRefSettings;

/// What the panel should display for a record right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectorState {
    /// Warning to show, if any
    pub warning: Option<Diagnostic>,
}

impl InspectorState {
    fn from_warning(warning: Option<ReferenceWarning>, locale: Locale) -> Self {
        Self {
            warning: warning.map(|w| Diagnostic::new(w, locale)),
        }
    }

    /// True when the warning box should be visible.
    pub fn has_warning(&self) -> bool {
        self.warning.is_some()
    }
}

/// Drives one reference field in an editor panel.
pub struct ReferenceInspector {
    engine: ReconciliationEngine,
    manifest: Arc<dyn BuildManifest>,
    locale: Locale,
    poll_interval: Duration,
    last_poll: Option<Instant>,
}

impl ReferenceInspector {
    /// Create an inspector using the locale, cadence and tooling from
    /// `settings`.
    ///
    /// `engine` may be a clone of the host's engine; play mode stays shared.
    pub fn new(
        engine: ReconciliationEngine,
        manifest: Arc<dyn BuildManifest>,
        settings: &SceneRefSettings,
    ) -> Self {
        Self {
            engine: engine.with_tooling(settings.tooling),
            manifest,
            locale: settings.locale,
            poll_interval: settings.poll_interval(),
            last_poll: None,
        }
    }

    /// Engine edits are routed through.
    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    /// True when enough time has passed since the last refresh at `now`.
    ///
    /// Marks `now` as the last refresh when it returns true.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        let due = self
            .last_poll
            .map_or(true, |last| now.saturating_duration_since(last) >= self.poll_interval);
        if due {
            self.last_poll = Some(now);
        }
        due
    }

    /// Current display state for `record`.
    ///
    /// Without a handle there is nothing to validate and no warning is
    /// shown. With one, the stored path is checked against the manifest.
    pub fn refresh(&self, record: &ReferenceRecord) -> InspectorState {
        if record.handle().is_none() {
            return InspectorState::default();
        }
        let warning = ManifestValidator::new(self.manifest.as_ref()).check(record.path());
        InspectorState::from_warning(warning, self.locale)
    }

    /// The user picked a different scene (or cleared the field).
    pub fn edit_handle(
        &self,
        record: &mut ReferenceRecord,
        handle: Option<ResourceHandle>,
    ) -> InspectorState {
        self.engine.assign_handle(record, handle);
        self.refresh(record)
    }

    /// The user typed a path.
    ///
    /// An unresolvable path is stored anyway and reported instead of the
    /// manifest check.
    pub fn edit_path(&self, record: &mut ReferenceRecord, path: &str) -> InspectorState {
        match self.engine.set_path(record, path) {
            Some(warning) => InspectorState::from_warning(Some(warning), self.locale),
            None => self.refresh(record),
        }
    }
}
