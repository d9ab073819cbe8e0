//! SerpAPI-backed searcher.
//!
//! Uses the google engine with `gl`/`hl` taken from the locale. Requests are
//! throttled with a `governor` rate limiter.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, SearchError, SearchResult, VerifyError};
use crate::traits::searcher::{SearchHit, Searcher};
use crate::types::locale::Locale;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

const SERPAPI_URL: &str = "https://serpapi.com/search";

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    source: String,
}

/// SerpAPI client.
pub struct SerpApiSearcher {
    client: reqwest::Client,
    api_key: SecretString,
    limiter: Arc<DefaultRateLimiter>,
    base_url: String,
}

impl SerpApiSearcher {
    /// Create a searcher; a blank key is a configuration error.
    pub fn new(api_key: &str, requests_per_second: u32) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(VerifyError::Config("SerpAPI key not configured".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(VerifyError::Client)?;
        let qps = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        Ok(Self {
            client,
            api_key: SecretString::from(api_key.trim().to_string()),
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(qps))),
            base_url: SERPAPI_URL.to_string(),
        })
    }

    /// Point at a different endpoint (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Searcher for SerpApiSearcher {
    async fn search(
        &self,
        query: &str,
        locale: &Locale,
        count: usize,
    ) -> SearchResult<Vec<SearchHit>> {
        self.limiter.until_ready().await;
        debug!(query = %query, hl = %locale.language_code, gl = %locale.market_code, "SerpAPI search");

        let num = count.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.expose_secret()),
                ("num", num.as_str()),
                ("gl", locale.market_code.as_str()),
                ("hl", locale.language_code.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(query = %query, error = %e, "SerpAPI request failed");
                SearchError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Provider(format!("SerpAPI {status}: {body}")));
        }

        // Body read failures are transport errors
        let text = response.text().await.map_err(|e| {
            warn!(query = %query, error = %e, "SerpAPI response body failed");
            body_error(e)
        })?;
        let body: SerpResponse =
            serde_json::from_str(&text).map_err(|e| SearchError::Parse(e.to_string()))?;

        if let Some(error) = body.error {
            // "hasn't returned any results" is an empty page, not a failure
            if error.to_lowercase().contains("any results") {
                return Ok(Vec::new());
            }
            return Err(SearchError::Provider(error));
        }

        Ok(body
            .organic_results
            .into_iter()
            .filter(|r| !r.link.is_empty())
            .take(count)
            .map(|r| SearchHit {
                title: r.title,
                link: r.link,
                snippet: r.snippet,
                source_label: r.source,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "serpapi"
    }
}

fn body_error(e: reqwest::Error) -> SearchError {
    if e.is_decode() {
        SearchError::Parse(e.to_string())
    } else {
        SearchError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hang up.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
        });
        format!("http://{addr}/search")
    }

    fn italy() -> Locale {
        Locale::new("it", "it", "Italiano")
    }

    #[tokio::test]
    async fn test_truncated_body_is_transport_error() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 500\r\n\r\n{\"organic_results\":[",
        )
        .await;
        let searcher = SerpApiSearcher::new("key", 10).unwrap().with_base_url(url);
        let err = searcher.search("sisma", &italy(), 5).await.unwrap_err();
        assert!(err.is_transport(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 8\r\nconnection: close\r\n\r\nnot json",
        )
        .await;
        let searcher = SerpApiSearcher::new("key", 10).unwrap().with_base_url(url);
        let err = searcher.search("sisma", &italy(), 5).await.unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_blank_key_is_config_error() {
        assert!(matches!(
            SerpApiSearcher::new("  ", 2),
            Err(VerifyError::Config(_))
        ));
    }

    #[test]
    fn test_zero_qps_is_clamped() {
        let searcher = SerpApiSearcher::new("key", 0).unwrap();
        assert_eq!(searcher.name(), "serpapi");
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let body: SerpResponse = serde_json::from_str(
            r#"{"organic_results":[{"title":"A","link":"https://ansa.it/a"}]}"#,
        )
        .unwrap();
        assert_eq!(body.organic_results.len(), 1);
        assert!(body.organic_results[0].snippet.is_empty());
        assert!(body.error.is_none());
    }
}
