//! End-to-end verification against mock providers.

use std::sync::Arc;

use news_verifier::pipeline::LOW_CONFIDENCE_MARKER;
use news_verifier::testing::{MockGenerator, MockSearcher};
use news_verifier::{
    Claim, LocaleCatalogue, NewsVerifier, SearchHit, SearchMode, VerificationStrategy,
};
use tokio_util::sync::CancellationToken;

const QUERY: &str = "terremoto città x";

fn earthquake_claim() -> Claim {
    Claim::new(
        "Città X colpita da terremoto",
        "Scosse avvertite in tutta la regione",
        "Agenzia Y",
        "2024-01-01",
    )
}

fn generator() -> MockGenerator {
    MockGenerator::new()
        .with_response(
            "Write three short web search queries",
            format!("Q1: {QUERY}\nQ2: scosse regione\nQ3: terremoto"),
        )
        .with_response("Router agent", "TYPE: NEWS\nREASON: seismic event")
        .with_response("Synthesizer agent", "1. **VERDICT**: [TRUE]\n2. **CONFIDENCE**: [MEDIUM]")
        .with_default_response("stage analysis")
}

fn earthquake_searcher() -> MockSearcher {
    MockSearcher::new()
        .with_hits(
            "it",
            format!("\"{QUERY}\" fact check"),
            vec![SearchHit::new("Il terremoto è vero", "https://facta.news/terremoto-x")
                .with_snippet("Nessuna bufala: la scossa è stata registrata")
                .with_source("Facta")],
        )
        .with_hits(
            "it",
            format!("\"{QUERY}\""),
            vec![
                SearchHit::new("Terremoto a Città X", "https://www.ansa.it/cronaca/terremoto-x")
                    .with_snippet("Scossa di magnitudo 4.1")
                    .with_source("ANSA"),
                SearchHit::new("Scosse in tutta la regione", "https://www.corriere.it/cronache/x")
                    .with_snippet("Paura ma nessun ferito")
                    .with_source("Corriere della Sera"),
            ],
        )
}

fn verifier(generator: MockGenerator, searcher: Arc<MockSearcher>) -> NewsVerifier {
    NewsVerifier::new(
        Arc::new(generator),
        searcher,
        Arc::new(LocaleCatalogue::builtin().unwrap()),
    )
}

#[tokio::test]
async fn test_italian_earthquake_end_to_end() {
    let searcher = Arc::new(earthquake_searcher());
    let verifier = verifier(generator(), searcher.clone());

    let verdict = verifier.verify(&earthquake_claim(), SearchMode::Fast).await;

    assert_eq!(verdict.query, QUERY);
    assert_eq!(verdict.locales[0].language_code, "it");
    assert_eq!(verdict.evidence.reliable_items.len(), 2);
    assert_eq!(verdict.evidence.fact_check_items.len(), 1);
    assert!(verdict.evidence.summary.contains("FACT-CHECKING:"));
    assert!(verdict.evidence.summary.contains("RELIABLE SOURCES:"));
    assert!(verdict.analysis_text.contains("[TRUE]"));
    assert!(!verdict.degraded);
    assert_eq!(verdict.stages.len(), 7);
    assert_eq!(verdict.strategy, VerificationStrategy::MultiAgent);

    // Only the home and fallback locales were searched
    assert!(searcher
        .calls()
        .iter()
        .all(|c| c.market_code == "it" || c.market_code == "us"));
}

#[tokio::test]
async fn test_fast_mode_combined_cap() {
    let many: Vec<SearchHit> = (0..5)
        .map(|i| SearchHit::new(format!("hit {i}"), format!("https://www.ansa.it/{i}")))
        .collect();
    let mut searcher = MockSearcher::new();
    for template in ["\"{q}\" fact check", "\"{q}\" fake news", "\"{q}\"", "\"{q}\" investigation"] {
        let query = template.replace("{q}", QUERY);
        searcher = searcher
            .with_hits("it", query.clone(), many.clone())
            .with_hits("us", query, many.clone());
    }
    let verifier = verifier(generator(), Arc::new(searcher));

    let verdict = verifier.verify(&earthquake_claim(), SearchMode::Fast).await;
    assert!(verdict.evidence.usable_count() <= 5);
}

#[tokio::test]
async fn test_identical_runs_give_identical_evidence() {
    let searcher = Arc::new(earthquake_searcher());
    let verifier = verifier(generator(), searcher);

    let first = verifier.verify(&earthquake_claim(), SearchMode::Fast).await;
    let second = verifier.verify(&earthquake_claim(), SearchMode::Fast).await;

    assert_eq!(first.evidence, second.evidence);
    assert_eq!(first.analysis_text, second.analysis_text);
    assert_eq!(first.locales, second.locales);
}

#[tokio::test]
async fn test_all_but_router_failing_degrades_with_marker() {
    let generator = MockGenerator::new()
        .with_response("Router agent", "TYPE: NEWS")
        .fail_by_default();
    let verifier = verifier(generator, Arc::new(earthquake_searcher()));

    let verdict = verifier.verify(&earthquake_claim(), SearchMode::Fast).await;

    assert!(verdict.degraded);
    assert!(verdict.analysis_text.contains(LOW_CONFIDENCE_MARKER));
    assert!(verdict.analysis_text.contains("[DUBIOUS]"));
    // query generation failed, so the keyword fallback was searched
    assert_eq!(verdict.query, "città x colpita terremoto scosse avvertite tutta regione");
}

#[tokio::test]
async fn test_verify_text_with_standard_strategy() {
    let generator = MockGenerator::new()
        .with_response("professional fact checker", "VERDICT: [FALSE]")
        .fail_on("Write three short web search queries");
    let searcher = Arc::new(MockSearcher::new());
    let verifier = verifier(generator, searcher.clone());

    let verdict = verifier
        .verify_text("La NASA ha trovato acqua su Marte", SearchMode::Fast, VerificationStrategy::Standard)
        .await;

    assert_eq!(verdict.analysis_text, "VERDICT: [FALSE]");
    assert!(!verdict.degraded);
    assert!(verdict.stages.is_empty());
    assert_eq!(verdict.query, "nasa trovato acqua marte");
    assert_eq!(verdict.locales[1].market_code, "us");
    assert_eq!(verdict.evidence.summary, news_verifier::pipeline::NO_EVIDENCE_MESSAGE);
    assert!(searcher.queries()[0].starts_with("\"nasa trovato acqua marte\""));
}

#[tokio::test]
async fn test_cancelled_verification_returns_partial_bundle() {
    let searcher = Arc::new(earthquake_searcher());
    let verifier = verifier(generator(), searcher.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let verdict = verifier
        .verify_cancellable(
            &earthquake_claim(),
            SearchMode::Large,
            VerificationStrategy::MultiAgent,
            &cancel,
        )
        .await;

    assert_eq!(searcher.call_count(), 0);
    assert_eq!(verdict.evidence.usable_count(), 0);
    assert!(verdict.degraded);
    assert!(!verdict.analysis_text.is_empty());
}

#[tokio::test]
async fn test_verdict_serializes_with_error_placeholders() {
    let searcher = MockSearcher::new().with_error(
        format!("\"{QUERY}\" fact check"),
        news_verifier::SearchError::Transport("timed out".into()),
    );
    let verifier = verifier(generator(), Arc::new(searcher));

    let verdict = verifier.verify(&earthquake_claim(), SearchMode::Fast).await;
    let json = serde_json::to_value(&verdict).unwrap();

    assert_eq!(json["evidence"]["fact_check_items"][0]["error"], "search transport error: timed out");
    assert_eq!(json["strategy"], "multi_agent");
    assert_eq!(json["degraded"], false);
}
