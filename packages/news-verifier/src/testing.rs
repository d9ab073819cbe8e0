//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the verification
//! library without making real LLM, search or network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{FetchError, FetchResult, GenerationError, GenerationResult, SearchError, SearchResult};
use crate::traits::{
    fetcher::{FetchedPage, PageFetcher},
    generator::Generator,
    searcher::{SearchHit, Searcher},
};
use crate::types::locale::Locale;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A mock generator with prompt-matched responses.
///
/// Rules match when the prompt contains their needle. Failures are checked
/// first, then responses in insertion order, then the default.
#[derive(Default)]
pub struct MockGenerator {
    responses: Vec<(String, String)>,
    failures: Vec<String>,
    delays: Vec<(String, Duration)>,
    default_response: Option<String>,
    fail_unmatched: bool,
    fail_everything: bool,

    /// Prompts received, in call order
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// Create a mock that answers "mock response" to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `response` to prompts containing `needle`.
    pub fn with_response(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.push((needle.into(), response.into()));
        self
    }

    /// Answer `response` to any prompt no rule matches.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = Some(response.into());
        self
    }

    /// Fail prompts containing `needle`.
    pub fn fail_on(mut self, needle: impl Into<String>) -> Self {
        self.failures.push(needle.into());
        self
    }

    /// Fail any prompt no response rule matches.
    pub fn fail_by_default(mut self) -> Self {
        self.fail_unmatched = true;
        self
    }

    /// Fail every call.
    pub fn fail_all(mut self) -> Self {
        self.fail_everything = true;
        self
    }

    /// Sleep before answering prompts containing `needle`.
    pub fn with_delay(mut self, needle: impl Into<String>, delay: Duration) -> Self {
        self.delays.push((needle.into(), delay));
        self
    }

    /// Number of generate calls made.
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> GenerationResult<String> {
        lock(&self.prompts).push(prompt.to_string());

        if let Some((_, delay)) = self.delays.iter().find(|(n, _)| prompt.contains(n.as_str())) {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_everything || self.failures.iter().any(|n| prompt.contains(n.as_str())) {
            return Err(GenerationError::Network("mock failure".into()));
        }

        if let Some((_, response)) = self.responses.iter().find(|(n, _)| prompt.contains(n.as_str())) {
            return Ok(response.clone());
        }

        if self.fail_unmatched {
            return Err(GenerationError::Api("no scripted response".into()));
        }
        Ok(self
            .default_response
            .clone()
            .unwrap_or_else(|| "mock response".to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Record of a call made to the mock searcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSearchCall {
    pub query: String,
    pub market_code: String,
    pub count: usize,
}

/// A mock searcher with hits keyed by market and exact query.
#[derive(Default)]
pub struct MockSearcher {
    hits: HashMap<(String, String), Vec<SearchHit>>,
    errors: HashMap<String, SearchError>,
    calls: Mutex<Vec<MockSearchCall>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `hits` for `query` in the locale with `market_code`.
    pub fn with_hits(
        mut self,
        market_code: impl Into<String>,
        query: impl Into<String>,
        hits: Vec<SearchHit>,
    ) -> Self {
        self.hits.insert((market_code.into(), query.into()), hits);
        self
    }

    /// Fail `query` in every locale.
    pub fn with_error(mut self, query: impl Into<String>, error: SearchError) -> Self {
        self.errors.insert(query.into(), error);
        self
    }

    pub fn calls(&self) -> Vec<MockSearchCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Queries received, in call order.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|c| c.query.clone()).collect()
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    async fn search(&self, query: &str, locale: &Locale, count: usize) -> SearchResult<Vec<SearchHit>> {
        lock(&self.calls).push(MockSearchCall {
            query: query.to_string(),
            market_code: locale.market_code.clone(),
            count,
        });

        if let Some(error) = self.errors.get(query) {
            return Err(error.clone());
        }
        let key = (locale.market_code.clone(), query.to_string());
        Ok(self
            .hits
            .get(&key)
            .map(|hits| hits.iter().take(count).cloned().collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock page fetcher serving predefined bodies.
///
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    errors: HashMap<String, FetchError>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Fail requests for `url`.
    pub fn with_error(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.errors.insert(url.into(), error);
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// URLs requested, in call order.
    pub fn requested(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str, _follow_redirects: bool) -> FetchResult<FetchedPage> {
        lock(&self.calls).push(url.to_string());

        if let Some(error) = self.errors.get(url) {
            return Err(error.clone());
        }
        match self.pages.get(url) {
            Some(body) => Ok(FetchedPage::ok(url, body.clone())),
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}
