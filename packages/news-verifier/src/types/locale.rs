//! Search locales and the loadable locale table.
//!
//! Trigger keywords and reliable-domain allow-lists are data, not logic:
//! the built-in table ships as `data/locales.json` and hosts may load their
//! own with [`LocaleCatalogue::from_json`].

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, VerifyError};

/// A language + market pair used to scope a web search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    /// Interface language (`hl`), e.g. "it".
    pub language_code: String,

    /// Country/market (`gl`), e.g. "it".
    pub market_code: String,

    /// Human readable name.
    pub display_name: String,
}

impl Locale {
    pub fn new(
        language_code: impl Into<String>,
        market_code: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            language_code: language_code.into(),
            market_code: market_code.into(),
            display_name: display_name.into(),
        }
    }
}

/// One row of the locale table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleEntry {
    /// Table key, e.g. "en-us".
    pub id: String,

    #[serde(flatten)]
    pub locale: Locale,

    /// Keywords/phrases that pull this locale into a search.
    #[serde(default)]
    pub triggers: Vec<String>,

    /// Outlets considered reliable for this locale.
    #[serde(default)]
    pub reliable_domains: Vec<String>,
}

impl LocaleEntry {
    /// Whether `link` points at one of this locale's reliable outlets.
    ///
    /// Matches the exact host or any subdomain of an allow-listed domain.
    pub fn is_reliable_link(&self, link: &str) -> bool {
        let Some(host) = link_host(link) else {
            return false;
        };
        self.reliable_domains.iter().any(|domain| {
            let domain = domain.trim().to_lowercase();
            host == domain || host.ends_with(&format!(".{domain}"))
        })
    }
}

/// Locale table as it appears on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCatalogue {
    /// Id of the claim's home locale; always searched first.
    home: String,

    /// Id of the locale added when no trigger matches.
    fallback: String,

    locales: Vec<LocaleEntry>,
}

/// The full locale table, with home and fallback resolved.
#[derive(Debug, Clone)]
pub struct LocaleCatalogue {
    home: Locale,
    fallback: Locale,
    entries: Vec<LocaleEntry>,
}

const BUILTIN_TABLE: &str = include_str!("../../data/locales.json");

impl LocaleCatalogue {
    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Parse and validate a locale table.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawCatalogue = serde_json::from_str(json)?;
        let resolve = |id: &str| {
            raw.locales
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.locale.clone())
                .ok_or_else(|| VerifyError::Config(format!("locale table has no entry for '{id}'")))
        };
        Ok(Self {
            home: resolve(&raw.home)?,
            fallback: resolve(&raw.fallback)?,
            entries: raw.locales,
        })
    }

    /// Load a locale table from disk.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            VerifyError::Config(format!("cannot read locale table {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// All rows in table order.
    pub fn entries(&self) -> &[LocaleEntry] {
        &self.entries
    }

    /// Look up the row describing `locale`.
    pub fn entry_for(&self, locale: &Locale) -> Option<&LocaleEntry> {
        self.entries.iter().find(|e| &e.locale == locale)
    }

    /// The home locale.
    pub fn home_locale(&self) -> &Locale {
        &self.home
    }

    /// The locale used when nothing matches.
    pub fn fallback_locale(&self) -> &Locale {
        &self.fallback
    }
}

/// Lowercased host of a link, without a leading `www.`.
pub fn link_host(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_parses() {
        let catalogue = LocaleCatalogue::builtin().unwrap();
        assert_eq!(catalogue.home_locale().language_code, "it");
        assert_eq!(catalogue.fallback_locale().language_code, "en");
        assert!(catalogue.entries().len() >= 5);
    }

    #[test]
    fn test_unknown_home_is_config_error() {
        let json = r#"{"home":"xx","fallback":"xx","locales":[]}"#;
        assert!(matches!(
            LocaleCatalogue::from_json(json),
            Err(VerifyError::Config(_))
        ));
    }

    #[test]
    fn test_reliable_link_matches_subdomains_only() {
        let entry = LocaleEntry {
            id: "it".into(),
            locale: Locale::new("it", "it", "Italiano"),
            triggers: vec![],
            reliable_domains: vec!["ansa.it".into(), "corriere.it".into()],
        };
        assert!(entry.is_reliable_link("https://www.ansa.it/sito/notizie/1.html"));
        assert!(entry.is_reliable_link("https://roma.corriere.it/news"));
        assert!(!entry.is_reliable_link("https://notansa.it/fake"));
        assert!(!entry.is_reliable_link("https://example.com/ansa.it"));
        assert!(!entry.is_reliable_link("not a url"));
    }

    #[test]
    fn test_link_host_strips_www() {
        assert_eq!(link_host("https://www.BBC.com/news"), Some("bbc.com".into()));
        assert_eq!(link_host(""), None);
    }
}
