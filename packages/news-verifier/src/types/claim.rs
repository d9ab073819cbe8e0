//! The news item or free-text statement being verified.

use serde::{Deserialize, Serialize};

/// A claim to verify.
///
/// Constructed by the feed collaborator, or by [`Claim::from_text`] for
/// ad-hoc user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Headline of the news item.
    pub title: String,

    /// Summary or body excerpt.
    #[serde(default)]
    pub summary: String,

    /// Outlet or author the claim came from.
    #[serde(default)]
    pub source_label: String,

    /// Publication date as supplied by the feed (not parsed).
    #[serde(default)]
    pub published_at: String,

    /// Set only by [`Claim::from_text`].
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    ad_hoc: bool,
}

/// Title used for claims built from free text.
pub const AD_HOC_TITLE: &str = "Custom text";

impl Claim {
    /// Create a claim from feed fields.
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        source_label: impl Into<String>,
        published_at: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            source_label: source_label.into(),
            published_at: published_at.into(),
            ad_hoc: false,
        }
    }

    /// Wrap free text into a synthetic claim with empty source and date.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            title: AD_HOC_TITLE.to_string(),
            summary: text.into(),
            source_label: String::new(),
            published_at: String::new(),
            ad_hoc: true,
        }
    }

    /// Whether this claim wraps ad-hoc text rather than a feed record.
    pub fn is_ad_hoc(&self) -> bool {
        self.ad_hoc
    }

    /// The statement under verification: the headline of a feed record, or
    /// the whole text of an ad-hoc claim.
    pub fn statement(&self) -> &str {
        if self.ad_hoc {
            &self.summary
        } else {
            &self.title
        }
    }

    /// Title and summary joined, used for locale selection.
    pub fn full_text(&self) -> String {
        if self.summary.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.summary)
        }
    }
}
