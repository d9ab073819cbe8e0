//! reqwest-based page fetcher.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::debug;

use crate::error::{FetchError, FetchResult, Result, VerifyError};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// Browser-like User-Agent to avoid bot detection.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches pages with a short timeout, following or not following redirects.
pub struct HttpFetcher {
    following: reqwest::Client,
    direct: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(10))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("it-IT,it;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let build = |policy: Policy| {
            reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(BROWSER_USER_AGENT)
                .default_headers(headers.clone())
                .redirect(policy)
                .build()
                .map_err(VerifyError::Client)
        };

        Ok(Self {
            following: build(Policy::limited(5))?,
            direct: build(Policy::none())?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, follow_redirects: bool) -> FetchResult<FetchedPage> {
        if url::Url::parse(url).is_err() {
            return Err(FetchError::InvalidUrl { url: url.to_string() });
        }
        let client = if follow_redirects {
            &self.following
        } else {
            &self.direct
        };

        debug!(url = %url, follow_redirects, "HTTP fetch starting");
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() && !status.is_redirection() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            location,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_request() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch("not a url", true).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
