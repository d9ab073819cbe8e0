//! Human-readable digest of the gathered evidence.

use crate::types::evidence::{usable, Evidence, EvidenceItem};

/// Returned when neither collection holds a usable hit.
pub const NO_EVIDENCE_MESSAGE: &str = "No verification evidence found.";

/// Items listed per collection.
const ITEMS_PER_SECTION: usize = 3;

/// Snippets are cut to this many characters.
const SNIPPET_CHARS: usize = 150;

/// Digest of both evidence collections. Error placeholders are ignored.
pub fn summarize(fact_check_items: &[EvidenceItem], reliable_items: &[EvidenceItem]) -> String {
    let fact_checks: Vec<&Evidence> = usable(fact_check_items).collect();
    let reliable: Vec<&Evidence> = usable(reliable_items).collect();

    if fact_checks.is_empty() && reliable.is_empty() {
        return NO_EVIDENCE_MESSAGE.to_string();
    }

    let mut lines = Vec::new();
    if !fact_checks.is_empty() {
        lines.push("FACT-CHECKING:".to_string());
        push_items(&mut lines, &fact_checks);
    }
    if !reliable.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("RELIABLE SOURCES:".to_string());
        push_items(&mut lines, &reliable);
    }

    lines.push(String::new());
    lines.push("ASSESSMENT:".to_string());
    lines.push(if fact_checks.is_empty() {
        "- No specific fact-check found".to_string()
    } else {
        format!("- Fact-checking coverage available ({} hits)", fact_checks.len())
    });
    lines.push(if reliable.is_empty() {
        "- Few reliable sources found".to_string()
    } else {
        format!("- Reliable sources covered the topic ({} hits)", reliable.len())
    });

    lines.join("\n")
}

fn push_items(lines: &mut Vec<String>, items: &[&Evidence]) {
    for (i, item) in items.iter().take(ITEMS_PER_SECTION).enumerate() {
        lines.push(format!("  {}. {} ({})", i + 1, item.title, item.source_label));
        if item.full_text.is_some() {
            lines.push("     (full text retrieved)".to_string());
        } else if !item.snippet.is_empty() {
            let snippet: String = item.snippet.chars().take(SNIPPET_CHARS).collect();
            let ellipsis = if item.snippet.chars().count() > SNIPPET_CHARS { "..." } else { "" };
            lines.push(format!("     {snippet}{ellipsis}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, snippet: &str, full_text: Option<&str>) -> EvidenceItem {
        EvidenceItem::Found(Evidence {
            title: title.into(),
            snippet: snippet.into(),
            link: format!("https://example.it/{title}"),
            source_label: "ANSA".into(),
            search_query: "q".into(),
            language_code: "it".into(),
            full_text: full_text.map(str::to_string),
        })
    }

    #[test]
    fn test_empty_and_placeholder_only_give_fixed_message() {
        assert_eq!(summarize(&[], &[]), NO_EVIDENCE_MESSAGE);
        let only_errors = [EvidenceItem::error("timeout")];
        assert_eq!(summarize(&only_errors, &only_errors), NO_EVIDENCE_MESSAGE);
    }

    #[test]
    fn test_lists_at_most_three_items_per_section() {
        let reliable: Vec<_> = (0..5).map(|i| item(&format!("r{i}"), "snip", None)).collect();
        let summary = summarize(&[], &reliable);
        assert!(summary.contains("  3. r2 (ANSA)"));
        assert!(!summary.contains("r3"));
        assert!(!summary.contains("FACT-CHECKING:"));
        assert!(summary.contains("- No specific fact-check found"));
        assert!(summary.contains("- Reliable sources covered the topic (5 hits)"));
    }

    #[test]
    fn test_full_text_note_and_snippet_truncation() {
        let long = "x".repeat(400);
        let summary = summarize(
            &[item("fc", &long, None)],
            &[item("rel", "short", Some("body"))],
        );
        assert!(summary.contains(&format!("     {}...", "x".repeat(150))));
        assert!(summary.contains("(full text retrieved)"));
        assert!(summary.starts_with("FACT-CHECKING:"));
    }
}
