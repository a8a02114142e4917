//! Host-tunable settings
//!
//! Loaded in three layers, later layers winning:
//! 1. **Compiled defaults**: [`SceneRefSettings::default()`]
//! 2. **Settings file**: JSON, deep-merged over the defaults
//! 3. **Environment variables**: `SCENEREF_*` overrides
//!
//! ```json
//! { "pollIntervalMs": 250, "locale": "ko", "tooling": "packaged" }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Result, SceneRefError};
use crate::messages::Locale;
use crate::record::Tooling;

/// Environment variable overriding [`SceneRefSettings::locale`].
pub const ENV_LOCALE: &str = "SCENEREF_LOCALE";
/// Environment variable overriding [`SceneRefSettings::poll_interval_ms`].
pub const ENV_POLL_INTERVAL_MS: &str = "SCENEREF_POLL_INTERVAL_MS";
/// Environment variable overriding [`SceneRefSettings::tooling`].
pub const ENV_TOOLING: &str = "SCENEREF_TOOLING";

/// Settings for hosts embedding scene references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneRefSettings {
    /// How often the inspector re-checks manifest membership.
    pub poll_interval_ms: u64,
    /// Language for advisory messages.
    pub locale: Locale,
    /// Whether the editor is present.
    pub tooling: Tooling,
}

impl Default for SceneRefSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            locale: Locale::default(),
            tooling: Tooling::default(),
        }
    }
}

impl SceneRefSettings {
    /// Polling interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Correct out-of-range values with a warning instead of failing.
    pub fn validate(&mut self) {
        if self.poll_interval_ms == 0 {
            tracing::warn!("poll_interval_ms must be at least 1, using 1");
            self.poll_interval_ms = 1;
        }
    }

    /// Apply `SCENEREF_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply `SCENEREF_*` overrides from `lookup`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(ENV_LOCALE) {
            match Locale::from_tag(&raw) {
                Some(locale) => self.locale = locale,
                None => tracing::warn!(value = %raw, "ignoring unknown {ENV_LOCALE}"),
            }
        }

        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.poll_interval_ms = ms,
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "ignoring invalid {ENV_POLL_INTERVAL_MS}")
                }
            }
        }

        if let Some(raw) = lookup(ENV_TOOLING) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "editor" => self.tooling = Tooling::Editor,
                "packaged" => self.tooling = Tooling::Packaged,
                _ => tracing::warn!(value = %raw, "ignoring unknown {ENV_TOOLING}"),
            }
        }
    }
}

/// Merge `overlay` into `base`, recursing into objects.
///
/// Non-object values in `overlay` replace those in `base`.
pub fn deep_merge(base: JsonValue, overlay: JsonValue) -> JsonValue {
    match (base, overlay) {
        (JsonValue::Object(mut base), JsonValue::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            JsonValue::Object(base)
        }
        (_, overlay) => overlay,
    }
}

/// Load settings from `path`, then apply environment overrides.
///
/// A missing file yields the defaults. A file that exists but cannot be
/// read or parsed is an error.
pub fn load_settings_from_path(path: &Path) -> Result<SceneRefSettings> {
    let mut settings = read_settings_file(path)?;
    settings.apply_env_overrides();
    settings.validate();
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<SceneRefSettings> {
    if !path.exists() {
        tracing::debug!(?path, "no settings file, using defaults");
        return Ok(SceneRefSettings::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| SceneRefError::SettingsIo {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_err = |source| SceneRefError::SettingsParse {
        path: path.to_path_buf(),
        source,
    };
    let overlay: JsonValue = serde_json::from_str(&raw).map_err(parse_err)?;
    let defaults = serde_json::to_value(SceneRefSettings::default())?;
    serde_json::from_value(deep_merge(defaults, overlay)).map_err(parse_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = SceneRefSettings::default();
        assert_eq!(settings.poll_interval_ms, 100);
        assert_eq!(settings.locale, Locale::English);
        assert_eq!(settings.tooling, Tooling::Editor);
        assert_eq!(settings.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: SceneRefSettings = serde_json::from_str(r#"{"locale":"ko"}"#).unwrap();
        assert_eq!(settings.locale, Locale::Korean);
        assert_eq!(settings.poll_interval_ms, 100);
    }

    #[test]
    fn test_deep_merge_nested() {
        let base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        let overlay = serde_json::json!({"a": {"y": 20}, "c": 4});
        let merged = deep_merge(base, overlay);
        assert_eq!(merged, serde_json::json!({"a": {"x": 1, "y": 20}, "b": 3, "c": 4}));
    }

    #[test]
    fn test_overrides_apply() {
        let mut settings = SceneRefSettings::default();
        settings.apply_overrides_from(lookup(&[
            (ENV_LOCALE, "ko-KR"),
            (ENV_POLL_INTERVAL_MS, "250"),
            (ENV_TOOLING, "Packaged"),
        ]));
        assert_eq!(settings.locale, Locale::Korean);
        assert_eq!(settings.poll_interval_ms, 250);
        assert_eq!(settings.tooling, Tooling::Packaged);
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut settings = SceneRefSettings::default();
        settings.apply_overrides_from(lookup(&[
            (ENV_LOCALE, "xx"),
            (ENV_POLL_INTERVAL_MS, "soon"),
            (ENV_TOOLING, "maybe"),
        ]));
        assert_eq!(settings, SceneRefSettings::default());
    }

    #[test]
    fn test_validate_clamps_zero_interval() {
        let mut settings = SceneRefSettings {
            poll_interval_ms: 0,
            ..Default::default()
        };
        settings.validate();
        assert_eq!(settings.poll_interval_ms, 1);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = read_settings_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, SceneRefSettings::default());
    }

    #[test]
    fn test_file_is_merged_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sceneref.json");
        std::fs::write(&path, r#"{"pollIntervalMs": 500}"#).unwrap();

        let settings = read_settings_file(&path).unwrap();
        assert_eq!(settings.poll_interval_ms, 500);
        assert_eq!(settings.locale, Locale::English);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sceneref.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            read_settings_file(&path),
            Err(SceneRefError::SettingsParse { .. })
        ));
    }
}
