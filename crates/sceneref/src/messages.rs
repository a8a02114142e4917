//! Advisory text for the presentation layer
//!
//! Message wording is not part of any contract; hosts may show it, log it,
//! or replace it.

use serde::{Deserialize, Serialize};

use crate::error::ReferenceWarning;

/// Language used for advisory messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// English, used when nothing else is configured
    #[default]
    #[serde(rename = "en")]
    English,

    /// Korean
    #[serde(rename = "ko")]
    Korean,
}

impl Locale {
    /// Parse a language tag such as `ko` or `en-US`. Unknown tags are `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.trim().to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::English),
            "ko" => Some(Locale::Korean),
            _ => None,
        }
    }
}

/// A warning paired with text for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong
    pub warning: ReferenceWarning,

    /// Human-readable explanation in the requested locale
    pub message: String,
}

impl Diagnostic {
    /// Render `warning` for `locale`.
    pub fn new(warning: ReferenceWarning, locale: Locale) -> Self {
        let message = message_for(&warning, locale);
        Self { warning, message }
    }
}

/// Text for `warning` in `locale`.
pub fn message_for(warning: &ReferenceWarning, locale: Locale) -> String {
    match (warning, locale) {
        (ReferenceWarning::NotManifested { .. }, Locale::English) => {
            "The scene is not included in the build manifest.\n\
             Suggestion: add the scene to the build manifest."
                .to_string()
        }
        (ReferenceWarning::NotManifested { .. }, Locale::Korean) => {
            "해당 씬은 빌드 목록에 포함되지 않았습니다.\n\
             제안: 빌드 목록에 씬을 추가해주세요."
                .to_string()
        }
        (ReferenceWarning::UnresolvedAssignment { path }, Locale::English) => {
            format!("The reference was set to '{path}', but no scene could be located there.")
        }
        (ReferenceWarning::UnresolvedAssignment { path }, Locale::Korean) => {
            format!("참조를 '{path}'(으)로 설정했지만, 해당 경로에 씬이 없습니다.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(Locale::from_tag("ko"), Some(Locale::Korean));
        assert_eq!(Locale::from_tag("ko-KR"), Some(Locale::Korean));
        assert_eq!(Locale::from_tag("EN_us"), Some(Locale::English));
        assert_eq!(Locale::from_tag("fr"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn test_locale_serde_tags() {
        assert_eq!(serde_json::to_string(&Locale::Korean).unwrap(), "\"ko\"");
        let parsed: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Locale::English);
    }

    #[test]
    fn test_messages_differ_by_locale() {
        let warning = ReferenceWarning::NotManifested {
            path: "levels/removed".into(),
        };
        let en = message_for(&warning, Locale::English);
        let ko = message_for(&warning, Locale::Korean);
        assert!(en.contains("build manifest"));
        assert_ne!(en, ko);
    }

    #[test]
    fn test_unresolved_message_names_path() {
        let d = Diagnostic::new(
            ReferenceWarning::UnresolvedAssignment {
                path: "levels/unknown".into(),
            },
            Locale::Korean,
        );
        assert!(d.message.contains("levels/unknown"));
    }
}
