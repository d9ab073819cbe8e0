//! The verification orchestrator.
//!
//! `verify(claim)` runs query construction, locale selection, evidence
//! retrieval and synthesis in order and returns a [`VerdictBundle`].

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::agents::{MultiAgentSynthesizer, Synthesis};
use super::extract::ContentExtractor;
use super::locales::LanguageSelector;
use super::query::QueryConstructor;
use super::retrieve::EvidenceRetriever;
use crate::traits::{fetcher::PageFetcher, generator::Generator, searcher::Searcher};
use crate::types::claim::Claim;
use crate::types::locale::LocaleCatalogue;
use crate::types::mode::SearchMode;
use crate::types::verdict::{VerdictBundle, VerificationStrategy};

/// Verifies news claims end to end.
///
/// # Example
///
/// ```rust,ignore
/// use news_verifier::{NewsVerifier, Claim, SearchMode, LocaleCatalogue};
///
/// let verifier = NewsVerifier::new(generator, searcher, Arc::new(LocaleCatalogue::builtin()?))
///     .with_fetcher(Arc::new(HttpFetcher::new()?));
/// let verdict = verifier.verify(&claim, SearchMode::Medium).await;
/// println!("{}", verdict.analysis_text);
/// ```
pub struct NewsVerifier {
    queries: QueryConstructor,
    selector: LanguageSelector,
    retriever: EvidenceRetriever,
    synthesizer: MultiAgentSynthesizer,
}

impl NewsVerifier {
    pub fn new(
        generator: Arc<dyn Generator>,
        searcher: Arc<dyn Searcher>,
        catalogue: Arc<LocaleCatalogue>,
    ) -> Self {
        Self {
            queries: QueryConstructor::new(generator.clone()),
            selector: LanguageSelector::new(catalogue.clone()),
            retriever: EvidenceRetriever::new(searcher, catalogue),
            synthesizer: MultiAgentSynthesizer::new(generator),
        }
    }

    /// Enable page-text extraction for modes that ask for it.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.retriever = self
            .retriever
            .with_extractor(ContentExtractor::new(fetcher));
        self
    }

    /// Set the whole multi-agent run deadline.
    pub fn with_pipeline_deadline(mut self, deadline: Duration) -> Self {
        self.synthesizer = self.synthesizer.with_deadline(deadline);
        self
    }

    /// Verify with the multi-agent strategy.
    pub async fn verify(&self, claim: &Claim, mode: SearchMode) -> VerdictBundle {
        self.verify_with(claim, mode, VerificationStrategy::MultiAgent)
            .await
    }

    pub async fn verify_with(
        &self,
        claim: &Claim,
        mode: SearchMode,
        strategy: VerificationStrategy,
    ) -> VerdictBundle {
        self.verify_cancellable(claim, mode, strategy, &CancellationToken::new())
            .await
    }

    /// Verify free text by wrapping it into an ad-hoc claim.
    pub async fn verify_text(
        &self,
        text: &str,
        mode: SearchMode,
        strategy: VerificationStrategy,
    ) -> VerdictBundle {
        self.verify_with(&Claim::from_text(text), mode, strategy)
            .await
    }

    /// Verify, honoring `cancel` at every network boundary.
    ///
    /// A cancelled run still returns a bundle: the evidence gathered so far
    /// and a degraded verdict.
    pub async fn verify_cancellable(
        &self,
        claim: &Claim,
        mode: SearchMode,
        strategy: VerificationStrategy,
        cancel: &CancellationToken,
    ) -> VerdictBundle {
        // Ad-hoc claims keep their whole text in the summary
        let (title, text) = if claim.is_ad_hoc() {
            ("", claim.summary.clone())
        } else {
            (claim.title.as_str(), claim.full_text())
        };

        let query = self.queries.build_query(title, &claim.summary).await;
        let locales = self.selector.select_locales(&text, mode);
        info!(
            claim = %claim.title,
            query = %query,
            mode = %mode,
            strategy = ?strategy,
            "Verifying claim"
        );

        let evidence = self
            .retriever
            .retrieve_cancellable(&query, &locales, mode, Some(text.as_str()), cancel)
            .await;

        let Synthesis { outcome, stages } = match strategy {
            VerificationStrategy::MultiAgent => {
                self.synthesizer
                    .synthesize_cancellable(claim, &evidence, cancel)
                    .await
            }
            VerificationStrategy::Standard => Synthesis {
                outcome: self.synthesizer.standard(claim, &evidence).await,
                stages: Vec::new(),
            },
        };

        let degraded = outcome.is_degraded();
        info!(claim = %claim.title, degraded, "Verification complete");

        VerdictBundle {
            evidence,
            analysis_text: outcome.into_text(),
            degraded,
            query,
            locales,
            stages,
            strategy,
            verified_at: Utc::now(),
        }
    }
}
