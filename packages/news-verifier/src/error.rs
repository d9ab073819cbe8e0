//! Typed errors for the verification library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Only configuration
//! problems surface to callers as hard failures; transport and parse errors
//! are absorbed by the components that meet them and turned into sentinel
//! values (error placeholders, `None` extractions, stage placeholders).

use thiserror::Error;

/// Errors surfaced to the host application.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Missing credential, unknown provider, unreadable locale table.
    #[error("config error: {0}")]
    Config(String),

    /// Locale table could not be parsed
    #[error("locale table parse error: {0}")]
    LocaleTable(#[from] serde_json::Error),

    /// Building an HTTP client failed
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors from the text-generation capability.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// Network error (connection failed, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, invalid request)
    #[error("API error: {0}")]
    Api(String),

    /// Response body did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Provider answered with no text
    #[error("empty response from {provider}")]
    Empty { provider: String },
}

/// Errors from the search provider.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// The request never produced a response (connect, DNS, timeout).
    #[error("search transport error: {0}")]
    Transport(String),

    /// Provider answered with an error status or quota message.
    #[error("search provider error: {0}")]
    Provider(String),

    /// Provider response could not be decoded.
    #[error("search response parse error: {0}")]
    Parse(String),
}

impl SearchError {
    /// Whether the whole call failed at the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Errors from fetching a web page.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Result type alias for host-facing operations.
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Result type alias for generation calls.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Result type alias for search calls.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Result type alias for page fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
