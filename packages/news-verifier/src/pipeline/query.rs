//! Search query construction.
//!
//! The model is asked for three short candidates; the first usable one wins.
//! Any failure falls back to a deterministic keyword query, so
//! [`QueryConstructor::build_query`] always returns something searchable.

use std::sync::Arc;
use tracing::{debug, info};

use super::prompts::format_query_prompt;
use crate::traits::generator::Generator;

/// Longest query, in whitespace tokens.
pub const MAX_QUERY_TOKENS: usize = 8;

/// Used when the claim has no usable text at all.
pub const BLANK_QUERY: &str = "news";

/// Token budget for the candidate prompt.
const QUERY_MAX_TOKENS: u32 = 60;

const STOP_WORDS: &[&str] = &[
    // Italian
    "il", "lo", "la", "i", "gli", "le", "un", "uno", "una", "di", "a", "da", "in", "con", "su",
    "per", "tra", "fra", "e", "ed", "o", "ma", "che", "chi", "non", "si", "del", "dello",
    "della", "dei", "degli", "delle", "al", "allo", "alla", "ai", "agli", "alle", "dal", "dallo",
    "dalla", "dai", "dagli", "dalle", "nel", "nello", "nella", "nei", "negli", "nelle", "sul",
    "sullo", "sulla", "sui", "sugli", "sulle", "come", "anche", "più", "è", "sono", "ha",
    "hanno", "questo", "questa", "quello", "quella", "suo", "sua", "loro", "ci", "ne", "l",
    // English
    "the", "an", "and", "or", "but", "of", "to", "on", "at", "by", "for", "with", "from", "as",
    "is", "are", "was", "were", "be", "been", "has", "have", "had", "it", "its", "this", "that",
    "these", "those", "not", "no", "will", "would", "can", "could", "about", "into", "over",
    "after", "before", "than", "s",
];

/// Builds compact search queries from a claim.
pub struct QueryConstructor {
    generator: Arc<dyn Generator>,
}

impl QueryConstructor {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Build a query for the claim. Never fails.
    pub async fn build_query(&self, title: &str, summary: &str) -> String {
        if title.trim().is_empty() && summary.trim().is_empty() {
            return BLANK_QUERY.to_string();
        }

        let prompt = format_query_prompt(title, summary);
        match self.generator.generate(&prompt, QUERY_MAX_TOKENS).await {
            Ok(response) => {
                if let Some(query) = parse_candidates(&response).into_iter().next() {
                    debug!(query = %query, "Using generated query");
                    return query;
                }
                info!(
                    generator = self.generator.name(),
                    "Generated query candidates unusable, using keyword fallback"
                );
            }
            Err(e) => {
                info!(
                    generator = self.generator.name(),
                    error = %e,
                    "Query generation failed, using keyword fallback"
                );
            }
        }

        fallback_query(title, summary)
    }
}

/// Parse `Q1:`/`Q2:`/`Q3:` lines, keeping candidates of 1..=8 tokens in order.
pub fn parse_candidates(response: &str) -> Vec<String> {
    response
        .lines()
        .filter_map(|line| {
            let line = line.trim().trim_start_matches(['-', '*', ' ']);
            let rest = line
                .strip_prefix('Q')
                .or_else(|| line.strip_prefix('q'))?;
            let (index, candidate) = rest.split_once(':')?;
            if !matches!(index.trim(), "1" | "2" | "3") {
                return None;
            }
            let candidate = candidate
                .trim()
                .trim_matches(|c: char| matches!(c, '"' | '\'' | '*' | '`'))
                .split_whitespace()
                .collect::<Vec<_>>();
            if candidate.is_empty() || candidate.len() > MAX_QUERY_TOKENS {
                return None;
            }
            Some(candidate.join(" "))
        })
        .collect()
}

/// Deterministic keyword query: lowercase, strip punctuation, drop stop
/// words, keep the first eight tokens.
pub fn fallback_query(title: &str, summary: &str) -> String {
    let text = format!("{title} {summary}").to_lowercase();
    let normalized: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    let keywords: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !STOP_WORDS.contains(t))
        .take(MAX_QUERY_TOKENS)
        .collect();

    if !keywords.is_empty() {
        return keywords.join(" ");
    }
    if !tokens.is_empty() {
        return tokens[..tokens.len().min(MAX_QUERY_TOKENS)].join(" ");
    }
    BLANK_QUERY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGenerator;
    use proptest::prelude::*;

    #[test]
    fn test_fallback_drops_stop_words_and_punctuation() {
        let query = fallback_query("Terremoto di magnitudo 5.2 in Calabria", "Nessun danno, dice la protezione civile.");
        assert_eq!(query, "terremoto magnitudo 5 2 calabria nessun danno dice");
    }

    #[test]
    fn test_fallback_uses_unfiltered_tokens_when_only_stop_words() {
        assert_eq!(fallback_query("The and of", ""), "the and of");
    }

    #[test]
    fn test_fallback_blank_input() {
        assert_eq!(fallback_query("  ", "\n"), BLANK_QUERY);
        assert_eq!(fallback_query("?!...", ""), BLANK_QUERY);
    }

    #[test]
    fn test_parse_candidates() {
        let response = "Q1: terremoto Calabria 2024\nQ2: \"scossa Cosenza\"\nQ3: ";
        assert_eq!(
            parse_candidates(response),
            vec!["terremoto Calabria 2024".to_string(), "scossa Cosenza".to_string()]
        );
    }

    #[test]
    fn test_parse_candidates_rejects_long_and_unprefixed() {
        let response = "Here are some queries\nQ1: one two three four five six seven eight nine\nQ4: nope";
        assert!(parse_candidates(response).is_empty());
    }

    #[tokio::test]
    async fn test_build_query_uses_first_candidate() {
        let generator = MockGenerator::new().with_default_response("Q1: nasa artemis launch\nQ2: artemis");
        let constructor = QueryConstructor::new(Arc::new(generator));
        let query = constructor.build_query("NASA launches Artemis", "").await;
        assert_eq!(query, "nasa artemis launch");
    }

    #[tokio::test]
    async fn test_build_query_falls_back_on_generation_error() {
        let generator = MockGenerator::new().fail_all();
        let constructor = QueryConstructor::new(Arc::new(generator));
        let query = constructor.build_query("NASA launches Artemis", "").await;
        assert_eq!(query, "nasa launches artemis");
    }

    #[tokio::test]
    async fn test_build_query_falls_back_on_unparsable_output() {
        let generator = MockGenerator::new().with_default_response("I cannot help with that.");
        let constructor = QueryConstructor::new(Arc::new(generator));
        let query = constructor.build_query("Vaccino ritirato dal mercato", "").await;
        assert_eq!(query, "vaccino ritirato mercato");
    }

    proptest! {
        #[test]
        fn prop_fallback_is_non_empty_and_bounded(title in ".{0,200}", summary in ".{0,400}") {
            let query = fallback_query(&title, &summary);
            prop_assert!(!query.trim().is_empty());
            prop_assert!(query.split_whitespace().count() <= MAX_QUERY_TOKENS);
        }

        #[test]
        fn prop_candidates_are_bounded(response in "(Q[1-3]: [a-z ]{0,80}\n){0,4}") {
            for candidate in parse_candidates(&response) {
                let tokens = candidate.split_whitespace().count();
                prop_assert!((1..=MAX_QUERY_TOKENS).contains(&tokens));
            }
        }
    }
}
