//! News Claim Verification Library
//!
//! Checks how plausible a news claim is by gathering multilingual web
//! evidence and running it through a chain of specialized reasoning stages.
//!
//! # Design Philosophy
//!
//! - Evidence first: fact-check hits and reliable-outlet hits are kept apart
//! - Budgets are data: every search mode is a row of limits
//! - Nothing takes a verification down: failures degrade to placeholders,
//!   keyword queries and a low-confidence verdict
//! - Library handles mechanics, host handles configuration
//!
//! # Usage
//!
//! ```rust,ignore
//! use news_verifier::{Claim, LocaleCatalogue, NewsVerifier, SearchMode};
//! use news_verifier::testing::{MockGenerator, MockSearcher};
//!
//! let verifier = NewsVerifier::new(
//!     Arc::new(MockGenerator::new()),
//!     Arc::new(MockSearcher::new()),
//!     Arc::new(LocaleCatalogue::builtin()?),
//! );
//!
//! let claim = Claim::new("Città X colpita da terremoto", "Scosse avvertite", "Agenzia Y", "2024-01-01");
//! let verdict = verifier.verify(&claim, SearchMode::Fast).await;
//! assert!(!verdict.analysis_text.is_empty());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Boundary capabilities (Generator, Searcher, PageFetcher)
//! - [`types`] - Claims, search modes, locales, evidence, verdicts
//! - [`pipeline`] - Query, locale, retrieval, extraction and synthesis stages
//! - [`ai`] - Ollama, OpenAI and Claude generators
//! - [`search`] - SerpAPI searcher
//! - [`fetchers`] - reqwest page fetcher
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod search;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{FetchError, GenerationError, SearchError, VerifyError};
pub use traits::{
    fetcher::{FetchedPage, PageFetcher},
    generator::Generator,
    searcher::{SearchHit, Searcher},
};
pub use types::{
    claim::Claim,
    evidence::{Evidence, EvidenceBundle, EvidenceItem},
    locale::{Locale, LocaleCatalogue, LocaleEntry},
    mode::SearchMode,
    verdict::{AgentStageResult, PipelineOutcome, StageOutcome, VerdictBundle, VerificationStrategy},
};

// Re-export the orchestrator and pipeline components
pub use pipeline::{
    summarize, ContentExtractor, EvidenceRetriever, LanguageSelector, MultiAgentSynthesizer,
    NewsVerifier, QueryConstructor,
};

// Re-export providers
pub use ai::{create_generator, ProviderSettings};
pub use fetchers::HttpFetcher;
pub use search::SerpApiSearcher;

// Re-export testing utilities
pub use testing::{MockFetcher, MockGenerator, MockSearcher};
