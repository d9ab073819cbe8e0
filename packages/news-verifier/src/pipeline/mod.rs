//! Verification pipeline.
//!
//! The pipeline orchestrates:
//! - Query construction (LLM candidates, keyword fallback)
//! - Locale selection from trigger keywords
//! - Evidence retrieval (fact-check pass, reliable-source pass)
//! - Page text extraction
//! - Evidence digest
//! - Multi-agent synthesis with staged fallbacks

pub mod agents;
pub mod extract;
pub mod locales;
pub mod prompts;
pub mod query;
pub mod retrieve;
pub mod summary;
pub mod verify;

pub use agents::{
    simple_synthesis, AnalysisType, MultiAgentSynthesizer, Stage, StageContext, StageDescriptor,
    Synthesis, LOW_CONFIDENCE_MARKER, PIPELINE,
};
pub use extract::{canonical_link, extract_main_text, ContentExtractor, MAX_CONTENT_CHARS};
pub use locales::LanguageSelector;
pub use query::{fallback_query, parse_candidates, QueryConstructor, MAX_QUERY_TOKENS};
pub use retrieve::{EvidenceRetriever, RESULTS_PER_SEARCH};
pub use summary::{summarize, NO_EVIDENCE_MESSAGE};
pub use verify::NewsVerifier;
