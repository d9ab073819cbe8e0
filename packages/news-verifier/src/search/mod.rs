//! Search provider implementations.
//!
//! - `SerpApiSearcher` - SerpAPI google engine, rate limited

mod serpapi;

pub use serpapi::SerpApiSearcher;
