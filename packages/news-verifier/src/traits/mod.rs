//! Boundary capabilities the pipeline consumes.
//!
//! Hosts implement these traits (or use the bundled implementations in
//! [`crate::ai`], [`crate::search`] and [`crate::fetchers`]) to provide text
//! generation, web search and page fetching.

pub mod fetcher;
pub mod generator;
pub mod searcher;
