//! Search budget profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named budget profile trading search depth for latency.
///
/// Selected once per verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Two query templates per locale, no page extraction.
    #[default]
    Fast,
    /// Three templates per locale, page extraction on.
    Medium,
    /// Five templates per locale, page extraction on.
    Large,
}

impl SearchMode {
    /// Query templates issued per locale and pass.
    pub fn queries_per_locale(self) -> usize {
        match self {
            Self::Fast => 2,
            Self::Medium => 3,
            Self::Large => 5,
        }
    }

    /// Hits one locale may contribute to a single pass.
    pub fn per_locale_cap(self) -> usize {
        match self {
            Self::Fast => 3,
            Self::Medium => 4,
            Self::Large => 6,
        }
    }

    /// Combined hits across both passes.
    pub fn result_cap(self) -> usize {
        match self {
            Self::Fast => 5,
            Self::Medium => 10,
            Self::Large => 20,
        }
    }

    /// Maximum number of locales searched.
    pub fn locale_cap(self) -> usize {
        match self {
            Self::Fast => 2,
            Self::Medium => 3,
            Self::Large => 4,
        }
    }

    /// Whether full page text is fetched for each surviving hit.
    pub fn extracts_full_text(self) -> bool {
        !matches!(self, Self::Fast)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(format!("unknown search mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budgets_grow_with_mode() {
        let modes = [SearchMode::Fast, SearchMode::Medium, SearchMode::Large];
        let queries: Vec<_> = modes.iter().map(|m| m.queries_per_locale()).collect();
        let locales: Vec<_> = modes.iter().map(|m| m.locale_cap()).collect();
        assert_eq!(queries, vec![2, 3, 5]);
        assert_eq!(locales, vec![2, 3, 4]);
        assert_eq!(SearchMode::Fast.result_cap(), 5);
    }

    #[test]
    fn test_fast_skips_extraction() {
        assert!(!SearchMode::Fast.extracts_full_text());
        assert!(SearchMode::Medium.extracts_full_text());
        assert!(SearchMode::Large.extracts_full_text());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Medium".parse::<SearchMode>(), Ok(SearchMode::Medium));
        assert!("huge".parse::<SearchMode>().is_err());
    }
}
