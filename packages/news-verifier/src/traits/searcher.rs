//! Web search capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchResult;
use crate::types::locale::Locale;

/// One organic result from a search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub source_label: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: String::new(),
            source_label: String::new(),
        }
    }

    /// Add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Add the outlet name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_label = source.into();
        self
    }
}

/// Locale-scoped web search.
///
/// Transport and quota failures come back as [`crate::error::SearchError`]
/// values; implementations must not panic on provider misbehaviour.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Search for `query` in `locale`, returning at most `count` hits.
    async fn search(&self, query: &str, locale: &Locale, count: usize)
        -> SearchResult<Vec<SearchHit>>;

    /// Provider name for logs.
    fn name(&self) -> &str {
        "search"
    }
}
