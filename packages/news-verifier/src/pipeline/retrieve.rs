//! Evidence retrieval: the fact-check pass and the reliable-source pass.
//!
//! Both passes share one running result budget. Searches run one at a time
//! so the budget is checked before every request; page extraction for the
//! surviving hits fans out with bounded, order-preserving concurrency.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::extract::ContentExtractor;
use super::query::BLANK_QUERY;
use super::summary::summarize;
use crate::traits::searcher::{SearchHit, Searcher};
use crate::types::evidence::{Evidence, EvidenceBundle, EvidenceItem};
use crate::types::locale::{Locale, LocaleCatalogue};
use crate::types::mode::SearchMode;

/// Hits requested per search call.
pub const RESULTS_PER_SEARCH: usize = 5;

/// Concurrent page extractions.
const EXTRACT_CONCURRENCY: usize = 4;

const FACT_CHECK_TEMPLATES: &[&str] = &[
    "\"{q}\" fact check",
    "\"{q}\" fake news",
    "\"{q}\" debunked",
    "\"{q}\" hoax",
    "\"{q}\" verification",
];

const RELIABLE_TEMPLATES: &[&str] = &[
    "\"{q}\"",
    "\"{q}\" investigation",
    "\"{q}\" news",
    "\"{q}\" official statement",
    "\"{q}\" report",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    FactCheck,
    Reliable,
}

impl Pass {
    fn name(self) -> &'static str {
        match self {
            Self::FactCheck => "fact_check",
            Self::Reliable => "reliable",
        }
    }

    fn templates(self) -> &'static [&'static str] {
        match self {
            Self::FactCheck => FACT_CHECK_TEMPLATES,
            Self::Reliable => RELIABLE_TEMPLATES,
        }
    }
}

/// Running total of usable hits across both passes.
#[derive(Debug)]
struct Budget {
    cap: usize,
    used: usize,
}

impl Budget {
    fn new(cap: usize) -> Self {
        Self { cap, used: 0 }
    }

    fn exhausted(&self) -> bool {
        self.used >= self.cap
    }

    fn take(&mut self) {
        self.used += 1;
    }
}

/// State threaded through both passes of one retrieval.
struct PassState<'a> {
    budget: Budget,
    provider_errors: usize,
    cancel: &'a CancellationToken,
}

/// Gathers fact-check and reliable-source evidence for a query.
pub struct EvidenceRetriever {
    searcher: Arc<dyn Searcher>,
    catalogue: Arc<LocaleCatalogue>,
    extractor: Option<ContentExtractor>,
}

impl EvidenceRetriever {
    pub fn new(searcher: Arc<dyn Searcher>, catalogue: Arc<LocaleCatalogue>) -> Self {
        Self {
            searcher,
            catalogue,
            extractor: None,
        }
    }

    /// Enable full-text extraction in modes that ask for it.
    pub fn with_extractor(mut self, extractor: ContentExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Run both passes.
    ///
    /// `content_hint` is searched for when `query` is blank.
    pub async fn retrieve(
        &self,
        query: &str,
        locales: &[Locale],
        mode: SearchMode,
        content_hint: Option<&str>,
    ) -> EvidenceBundle {
        self.retrieve_cancellable(query, locales, mode, content_hint, &CancellationToken::new())
            .await
    }

    /// Run both passes, stopping early once `cancel` fires.
    ///
    /// A cancelled retrieval returns whatever was gathered so far.
    pub async fn retrieve_cancellable(
        &self,
        query: &str,
        locales: &[Locale],
        mode: SearchMode,
        content_hint: Option<&str>,
        cancel: &CancellationToken,
    ) -> EvidenceBundle {
        let query = effective_query(query, content_hint);
        let mut state = PassState {
            budget: Budget::new(mode.result_cap()),
            provider_errors: 0,
            cancel,
        };

        let mut fact_check_items = self
            .run_pass(Pass::FactCheck, &query, locales, mode, &mut state)
            .await;
        let mut reliable_items = self
            .run_pass(Pass::Reliable, &query, locales, mode, &mut state)
            .await;

        if mode.extracts_full_text() {
            self.enrich(&mut fact_check_items, cancel).await;
            self.enrich(&mut reliable_items, cancel).await;
        }

        let summary = summarize(&fact_check_items, &reliable_items);
        let bundle = EvidenceBundle {
            fact_check_items,
            reliable_items,
            summary,
            provider_errors: state.provider_errors,
        };

        info!(
            query = %query,
            mode = %mode,
            fact_checks = bundle.fact_checks().count(),
            reliable = bundle.reliable().count(),
            errors = bundle.error_count(),
            provider_errors = bundle.provider_errors,
            "Evidence retrieval complete"
        );
        bundle
    }

    async fn run_pass(
        &self,
        pass: Pass,
        query: &str,
        locales: &[Locale],
        mode: SearchMode,
        state: &mut PassState<'_>,
    ) -> Vec<EvidenceItem> {
        let mut items = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        'locales: for locale in locales {
            let entry = self.catalogue.entry_for(locale);
            if pass == Pass::Reliable && entry.is_none() {
                debug!(locale = %locale.display_name, "No allow-list for locale, skipping reliable pass");
                continue;
            }

            let mut locale_count = 0;
            for template in pass.templates().iter().take(mode.queries_per_locale()) {
                if state.budget.exhausted() {
                    debug!(pass = pass.name(), used = state.budget.used, "Result budget exhausted");
                    break 'locales;
                }
                if locale_count >= mode.per_locale_cap() {
                    break;
                }
                if state.cancel.is_cancelled() {
                    info!(pass = pass.name(), "Retrieval cancelled");
                    break 'locales;
                }

                let search_query = template.replace("{q}", query);
                let hits = match self
                    .searcher
                    .search(&search_query, locale, RESULTS_PER_SEARCH)
                    .await
                {
                    Ok(hits) => hits,
                    Err(e) if e.is_transport() => {
                        warn!(
                            pass = pass.name(),
                            query = %search_query,
                            locale = %locale.display_name,
                            error = %e,
                            "Search transport failure"
                        );
                        items.push(EvidenceItem::error(e.to_string()));
                        continue;
                    }
                    Err(e) => {
                        warn!(
                            pass = pass.name(),
                            provider = self.searcher.name(),
                            query = %search_query,
                            locale = %locale.display_name,
                            error = %e,
                            "Search provider error, skipping"
                        );
                        state.provider_errors += 1;
                        continue;
                    }
                };

                for hit in hits {
                    if state.budget.exhausted() || locale_count >= mode.per_locale_cap() {
                        break;
                    }
                    if seen.contains(&hit.link) {
                        continue;
                    }
                    if pass == Pass::Reliable
                        && !entry.is_some_and(|e| e.is_reliable_link(&hit.link))
                    {
                        continue;
                    }
                    seen.insert(hit.link.clone());
                    items.push(EvidenceItem::Found(to_evidence(hit, &search_query, locale)));
                    locale_count += 1;
                    state.budget.take();
                }
            }
        }

        items
    }

    /// Fill `full_text` for every usable hit, keeping order.
    async fn enrich(&self, items: &mut [EvidenceItem], cancel: &CancellationToken) {
        let Some(extractor) = &self.extractor else {
            return;
        };
        let links: Vec<String> = items
            .iter()
            .filter_map(EvidenceItem::as_evidence)
            .map(|e| e.link.clone())
            .collect();

        let texts: Vec<Option<String>> = stream::iter(links)
            .map(|link| async move {
                if cancel.is_cancelled() {
                    return None;
                }
                extractor.extract(&link).await
            })
            .buffered(EXTRACT_CONCURRENCY)
            .collect()
            .await;

        let mut texts = texts.into_iter();
        for item in items.iter_mut() {
            if let EvidenceItem::Found(evidence) = item {
                evidence.full_text = texts.next().flatten();
            }
        }
    }
}

fn effective_query(query: &str, content_hint: Option<&str>) -> String {
    let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if !query.is_empty() {
        return query;
    }
    let hint = content_hint
        .map(|h| h.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    if hint.is_empty() {
        BLANK_QUERY.to_string()
    } else {
        hint
    }
}

fn to_evidence(hit: SearchHit, search_query: &str, locale: &Locale) -> Evidence {
    Evidence {
        title: hit.title,
        snippet: hit.snippet,
        link: hit.link,
        source_label: hit.source_label,
        search_query: search_query.to_string(),
        language_code: locale.language_code.clone(),
        full_text: None,
    }
}
