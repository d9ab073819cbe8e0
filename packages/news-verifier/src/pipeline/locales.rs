//! Choosing which locales to search for a claim.

use std::sync::Arc;
use tracing::debug;

use crate::types::locale::{Locale, LocaleCatalogue};
use crate::types::mode::SearchMode;

/// Maps claim text to an ordered list of search locales.
///
/// The home locale always comes first. Other locales are pulled in by
/// trigger keywords, in table order, and the list is cut to the mode's
/// locale cap.
#[derive(Debug, Clone)]
pub struct LanguageSelector {
    catalogue: Arc<LocaleCatalogue>,
}

impl LanguageSelector {
    pub fn new(catalogue: Arc<LocaleCatalogue>) -> Self {
        Self { catalogue }
    }

    pub fn select_locales(&self, text: &str, mode: SearchMode) -> Vec<Locale> {
        let haystack = padded(text);
        let home = self.catalogue.home_locale();

        let mut selected = vec![home.clone()];
        for entry in self.catalogue.entries() {
            if selected.contains(&entry.locale) {
                continue;
            }
            let hit = entry
                .triggers
                .iter()
                .map(|t| padded(t))
                .any(|trigger| !trigger.trim().is_empty() && haystack.contains(&trigger));
            if hit {
                selected.push(entry.locale.clone());
            }
        }

        if selected.len() == 1 {
            let fallback = self.catalogue.fallback_locale();
            if fallback != home {
                selected.push(fallback.clone());
            }
        }

        selected.truncate(mode.locale_cap().max(1));
        debug!(
            mode = %mode,
            locales = ?selected.iter().map(|l| l.language_code.as_str()).collect::<Vec<_>>(),
            "Selected search locales"
        );
        selected
    }
}

/// Lowercase, punctuation to spaces, single-spaced, padded with one space
/// on each side so `contains(" word ")` is a word-boundary match.
fn padded(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut out = String::with_capacity(lowered.len() + 2);
    out.push(' ');
    for token in lowered.split_whitespace() {
        out.push_str(token);
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn selector() -> LanguageSelector {
        LanguageSelector::new(Arc::new(LocaleCatalogue::builtin().unwrap()))
    }

    fn codes(locales: &[Locale]) -> Vec<(&str, &str)> {
        locales
            .iter()
            .map(|l| (l.language_code.as_str(), l.market_code.as_str()))
            .collect()
    }

    #[test]
    fn test_nasa_pulls_english() {
        let locales = selector().select_locales("La NASA annuncia una nuova missione", SearchMode::Fast);
        assert_eq!(codes(&locales), vec![("it", "it"), ("en", "us")]);
    }

    #[test]
    fn test_triggers_match_on_word_boundaries_only() {
        // "parigino" must not trigger "parigi", "nasale" must not trigger "nasa"
        let locales = selector().select_locales("Spray nasale parigino", SearchMode::Large);
        assert_eq!(codes(&locales), vec![("it", "it"), ("en", "us")]);
    }

    #[test]
    fn test_multi_word_trigger() {
        let locales = selector().select_locales("Vertice alla Casa Bianca, poi Londra", SearchMode::Large);
        assert_eq!(codes(&locales), vec![("it", "it"), ("en", "us"), ("en", "uk")]);
    }

    #[test]
    fn test_cap_follows_mode() {
        let text = "NASA, Londra, Parigi e Berlino";
        assert_eq!(selector().select_locales(text, SearchMode::Fast).len(), 2);
        assert_eq!(selector().select_locales(text, SearchMode::Medium).len(), 3);
        assert_eq!(selector().select_locales(text, SearchMode::Large).len(), 4);
    }

    #[test]
    fn test_empty_input_keeps_home() {
        let locales = selector().select_locales("   ", SearchMode::Fast);
        assert_eq!(locales[0].language_code, "it");
    }

    proptest! {
        #[test]
        fn prop_home_first_and_cap_honored(text in ".{0,120}", mode_idx in 0usize..3) {
            let mode = [SearchMode::Fast, SearchMode::Medium, SearchMode::Large][mode_idx];
            let locales = selector().select_locales(&text, mode);
            prop_assert!(!locales.is_empty());
            prop_assert!(locales.len() <= mode.locale_cap());
            prop_assert_eq!(&locales[0].language_code, "it");
        }
    }
}
