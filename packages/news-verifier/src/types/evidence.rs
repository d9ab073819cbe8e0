//! Evidence gathered from search providers and web pages.

use serde::{Deserialize, Serialize};

/// One search hit, optionally enriched with the page's main text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub title: String,
    pub snippet: String,
    pub link: String,

    /// Outlet name as reported by the provider.
    pub source_label: String,

    /// The exact query string that produced this hit.
    pub search_query: String,

    /// Language of the locale the hit was found in.
    pub language_code: String,

    /// Present only when extraction was attempted and succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
}

/// An evidence slot: a usable hit, or a placeholder for a failed query attempt.
///
/// Placeholders are excluded from every aggregation and counted separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvidenceItem {
    Found(Evidence),
    Error { error: String },
}

impl EvidenceItem {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn as_evidence(&self) -> Option<&Evidence> {
        match self {
            Self::Found(e) => Some(e),
            Self::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Iterate the usable hits of a list, skipping placeholders.
pub fn usable(items: &[EvidenceItem]) -> impl Iterator<Item = &Evidence> {
    items.iter().filter_map(EvidenceItem::as_evidence)
}

/// Evidence collected for one claim.
///
/// The two collections answer different questions: "has this been
/// fact-checked" and "do trusted outlets corroborate it".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub fact_check_items: Vec<EvidenceItem>,
    pub reliable_items: Vec<EvidenceItem>,

    /// Human-readable digest of both collections.
    pub summary: String,

    /// Provider-level failures that were logged and skipped.
    #[serde(default)]
    pub provider_errors: usize,
}

impl EvidenceBundle {
    pub fn fact_checks(&self) -> impl Iterator<Item = &Evidence> {
        usable(&self.fact_check_items)
    }

    pub fn reliable(&self) -> impl Iterator<Item = &Evidence> {
        usable(&self.reliable_items)
    }

    /// Usable hits across both collections.
    pub fn usable_count(&self) -> usize {
        self.fact_checks().count() + self.reliable().count()
    }

    /// Error placeholders across both collections.
    pub fn error_count(&self) -> usize {
        self.fact_check_items
            .iter()
            .chain(&self.reliable_items)
            .filter(|i| i.is_error())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(link: &str) -> EvidenceItem {
        EvidenceItem::Found(Evidence {
            title: "t".into(),
            snippet: "s".into(),
            link: link.into(),
            source_label: "src".into(),
            search_query: "q".into(),
            language_code: "it".into(),
            full_text: None,
        })
    }

    #[test]
    fn test_counts_skip_placeholders() {
        let bundle = EvidenceBundle {
            fact_check_items: vec![hit("https://a.it"), EvidenceItem::error("timeout")],
            reliable_items: vec![EvidenceItem::error("timeout"), hit("https://b.it")],
            summary: String::new(),
            provider_errors: 0,
        };
        assert_eq!(bundle.usable_count(), 2);
        assert_eq!(bundle.error_count(), 2);
        assert_eq!(bundle.fact_checks().count(), 1);
        assert_eq!(bundle.reliable().count(), 1);
    }

    #[test]
    fn test_error_serializes_as_error_object() {
        let json = serde_json::to_value(EvidenceItem::error("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom"}));
    }
}
