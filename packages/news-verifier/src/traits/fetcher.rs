//! Page fetching capability used by the content extractor.

use async_trait::async_trait;

use crate::error::FetchResult;

/// A fetched HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL after any redirects that were followed.
    pub final_url: String,
    pub status: u16,

    /// `Location` header, present when redirects were not followed.
    pub location: Option<String>,
    pub body: String,
}

impl FetchedPage {
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            final_url: url.into(),
            status: 200,
            location: None,
            body: body.into(),
        }
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// HTTP GET with an optional redirect policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`. With `follow_redirects == false` a 3xx response is
    /// returned as-is with its `Location` header; it is not an error.
    async fn fetch(&self, url: &str, follow_redirects: bool) -> FetchResult<FetchedPage>;
}
