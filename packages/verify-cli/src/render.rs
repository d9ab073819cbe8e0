//! Colored plain-text rendering of a verdict.

use colored::Colorize;
use news_verifier::{Claim, Evidence, VerdictBundle};
use std::fmt::Write;

const RULE: &str = "════════════════════════════════════════════════════════════";

pub fn render(claim: &Claim, verdict: &VerdictBundle) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", RULE.bright_cyan());
    let _ = writeln!(out, "{} {}", "CLAIM:".bold(), claim.statement());
    if !claim.source_label.is_empty() || !claim.published_at.is_empty() {
        let _ = writeln!(out, "  {} {}  {}", "source:".dimmed(), claim.source_label, claim.published_at);
    }
    let locales: Vec<&str> = verdict.locales.iter().map(|l| l.display_name.as_str()).collect();
    let _ = writeln!(out, "  {} {}", "query:".dimmed(), verdict.query);
    let _ = writeln!(out, "  {} {}", "locales:".dimmed(), locales.join(", "));
    let _ = writeln!(out, "{}", RULE.bright_cyan());

    section(&mut out, "FACT-CHECKING", verdict.evidence.fact_checks());
    section(&mut out, "RELIABLE SOURCES", verdict.evidence.reliable());

    let errors = verdict.evidence.error_count() + verdict.evidence.provider_errors;
    if errors > 0 {
        let _ = writeln!(out, "{}", format!("⚠ {errors} search requests failed").yellow());
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "ANALYSIS".bold().bright_blue());
    let _ = writeln!(out, "{}", verdict.analysis_text);

    if verdict.degraded {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}",
            "⚠ Degraded verdict: some reasoning stages failed".yellow().bold()
        );
    }
    for stage in verdict.stages.iter().filter(|s| s.failed) {
        let _ = writeln!(out, "  {} {}", "failed stage:".dimmed(), stage.stage_name.red());
    }

    out
}

fn section<'a>(out: &mut String, title: &str, items: impl Iterator<Item = &'a Evidence>) {
    let items: Vec<&Evidence> = items.collect();
    let _ = writeln!(out);
    let _ = writeln!(out, "{} ({})", title.bold().bright_green(), items.len());
    if items.is_empty() {
        let _ = writeln!(out, "  {}", "none found".dimmed());
    }
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} ({})", i + 1, item.title, item.source_label.dimmed());
        let _ = writeln!(out, "     {}", item.link.underline());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_verifier::testing::{MockGenerator, MockSearcher};
    use news_verifier::{LocaleCatalogue, NewsVerifier, SearchHit, SearchMode};
    use std::sync::Arc;

    async fn degraded_verdict(claim: &Claim) -> VerdictBundle {
        let searcher = MockSearcher::new().with_hits(
            "it",
            "\"sisma\"",
            vec![SearchHit::new("Scossa in Calabria", "https://www.ansa.it/a").with_source("ANSA")],
        );
        let generator = MockGenerator::new()
            .with_response("Write three short web search queries", "Q1: sisma")
            .fail_on("Synthesizer agent");
        let verifier = NewsVerifier::new(
            Arc::new(generator),
            Arc::new(searcher),
            Arc::new(LocaleCatalogue::builtin().unwrap()),
        );
        verifier.verify(claim, SearchMode::Fast).await
    }

    #[tokio::test]
    async fn test_render_lists_sections_and_degradation() {
        colored::control::set_override(false);
        let claim = Claim::new("Sisma in Calabria", "", "Agenzia Y", "2024-01-01");
        let text = render(&claim, &degraded_verdict(&claim).await);

        assert!(text.contains("CLAIM: Sisma in Calabria"));
        assert!(text.contains("FACT-CHECKING (0)"));
        assert!(text.contains("RELIABLE SOURCES (1)"));
        assert!(text.contains("1. Scossa in Calabria (ANSA)"));
        assert!(text.contains("Degraded verdict"));
        assert!(text.contains("failed stage: synthesizer"));
    }
}
