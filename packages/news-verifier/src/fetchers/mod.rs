//! Page fetcher implementations.
//!
//! - `HttpFetcher` - reqwest with a browser-like user agent

mod http;

pub use http::{HttpFetcher, BROWSER_USER_AGENT};
