//! Caption track selection.

use super::CaptionTrack;
use thiserror::Error;

/// Language preference used when none is configured.
pub const DEFAULT_PREFERRED_LANGUAGES: [&str; 2] = ["ko", "en"];

/// Why no caption track could be selected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no human-authored captions")]
    NoHumanCaptions,

    #[error("no captions in any preferred language ({})", .preferences.join(", "))]
    NoPreferredLanguage { preferences: Vec<String> },
}

/// Pick a caption track by language preference.
///
/// Auto-generated tracks are never eligible. Preference order dominates
/// catalog order; among tracks sharing a language the first listed wins.
pub fn select_caption<'a, S: AsRef<str>>(
    catalog: &'a [CaptionTrack],
    preference_order: &[S],
) -> Result<&'a CaptionTrack, SelectionError> {
    let eligible: Vec<&CaptionTrack> = catalog
        .iter()
        .filter(|track| !track.is_auto_generated)
        .collect();

    if eligible.is_empty() {
        return Err(SelectionError::NoHumanCaptions);
    }

    preference_order
        .iter()
        .find_map(|lang| {
            eligible
                .iter()
                .copied()
                .find(|track| track.language_code == lang.as_ref())
        })
        .ok_or_else(|| SelectionError::NoPreferredLanguage {
            preferences: preference_order
                .iter()
                .map(|lang| lang.as_ref().to_string())
                .collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: &str, id: &str, asr: bool) -> CaptionTrack {
        CaptionTrack::new(lang, id, asr)
    }

    #[test]
    fn test_only_auto_generated_is_not_found() {
        let catalog = vec![track("ko", "t1", true), track("en", "t2", true)];
        assert_eq!(
            select_caption(&catalog, &DEFAULT_PREFERRED_LANGUAGES),
            Err(SelectionError::NoHumanCaptions)
        );
    }

    #[test]
    fn test_empty_catalog_is_not_found() {
        assert_eq!(
            select_caption(&[], &DEFAULT_PREFERRED_LANGUAGES),
            Err(SelectionError::NoHumanCaptions)
        );
    }

    #[test]
    fn test_preference_order_dominates_catalog_order() {
        let catalog = vec![track("en", "t1", false), track("ko", "t2", false)];
        let selected = select_caption(&catalog, &DEFAULT_PREFERRED_LANGUAGES).unwrap();
        assert_eq!(selected.track_id, "t2");
    }

    #[test]
    fn test_auto_generated_preferred_language_falls_through() {
        let catalog = vec![track("en", "t1", false), track("ko", "t2", true)];
        let selected = select_caption(&catalog, &DEFAULT_PREFERRED_LANGUAGES).unwrap();
        assert_eq!(selected.track_id, "t1");
        assert_eq!(selected.language_code, "en");
    }

    #[test]
    fn test_first_match_in_catalog_order() {
        let catalog = vec![
            track("ko", "first", false),
            track("ko", "second", false),
        ];
        let selected = select_caption(&catalog, &["ko"]).unwrap();
        assert_eq!(selected.track_id, "first");
    }

    #[test]
    fn test_no_preferred_language_names_configured_preferences() {
        let catalog = vec![track("fr", "t1", false)];
        let prefs = vec!["ja".to_string(), "de".to_string()];
        let err = select_caption(&catalog, &prefs).unwrap_err();

        assert_eq!(
            err,
            SelectionError::NoPreferredLanguage {
                preferences: prefs.clone()
            }
        );
        assert_eq!(
            err.to_string(),
            "no captions in any preferred language (ja, de)"
        );
    }
}
