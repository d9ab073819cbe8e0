//! Main-body text extraction from article pages.
//!
//! Never raises: every failure (transport, status, unresolvable aggregator
//! link, empty page) comes back as `None`.

use scraper::{ElementRef, Html, Node, Selector};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::locale::link_host;

/// Extracted text is cut to this many characters.
pub const MAX_CONTENT_CHARS: usize = 4000;

/// A content region must have more than this many characters to be accepted.
const MIN_REGION_CHARS: usize = 200;

const AGGREGATOR_HOST: &str = "news.google.com";

/// Elements whose text is never content.
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe",
];

/// Content containers, most specific first.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role='main']",
    ".article-body",
    ".article-content",
    ".entry-content",
    ".post-content",
    ".story-body",
    "[class*='article']",
    "[class*='content']",
    "[class*='post']",
    "main",
];

/// Fetches article pages and reduces them to cleaned main-body text.
#[derive(Clone)]
pub struct ContentExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl ContentExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Cleaned main text of the page at `url`, or `None`.
    pub async fn extract(&self, url: &str) -> Option<String> {
        let page = if is_aggregator(url) {
            match self.resolve_aggregator(url).await? {
                Resolved::Page(page) => {
                    debug!(wrapper = %url, canonical = %page.final_url, "Aggregator redirected to article");
                    page
                }
                Resolved::Link(canonical) => {
                    debug!(wrapper = %url, canonical = %canonical, "Resolved aggregator link");
                    self.fetch(&canonical, true).await?
                }
            }
        } else {
            self.fetch(url, true).await?
        };

        let text = extract_main_text(&page.body);
        if text.is_none() {
            debug!(url = %url, "No text content found");
        }
        text
    }

    async fn fetch(&self, url: &str, follow_redirects: bool) -> Option<FetchedPage> {
        match self.fetcher.fetch(url, follow_redirects).await {
            Ok(page) => Some(page),
            Err(e) => {
                warn!(url = %url, error = %e, "Content fetch failed");
                None
            }
        }
    }

    /// Find the article a wrapped aggregator link points at.
    async fn resolve_aggregator(&self, url: &str) -> Option<Resolved> {
        let mut page = self.fetch(url, true).await?;

        if is_consent_host(&page.final_url) {
            debug!(url = %url, "Landed on consent page, retrying without redirects");
            page = self.fetch(url, false).await?;
        }

        if page.is_redirect() {
            if let Some(location) = page.location.as_deref() {
                if is_article_link(location) {
                    return Some(Resolved::Link(location.to_string()));
                }
            }
        }

        if is_article_link(&page.final_url) {
            return Some(Resolved::Page(page));
        }

        let canonical = canonical_link(&page.body);
        if canonical.is_none() {
            debug!(url = %url, "Aggregator wrapper has no canonical link");
        }
        canonical.map(Resolved::Link)
    }
}

/// Where an aggregator wrapper led.
enum Resolved {
    /// Redirects already landed on the article.
    Page(FetchedPage),
    /// The article still has to be fetched.
    Link(String),
}

fn is_aggregator(url: &str) -> bool {
    link_host(url).is_some_and(|h| h == AGGREGATOR_HOST)
}

fn is_consent_host(url: &str) -> bool {
    link_host(url).is_some_and(|h| h.starts_with("consent."))
}

/// An http(s) link outside the aggregator and its consent pages.
fn is_article_link(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("http://") || url.starts_with("https://"))
        && !is_aggregator(url)
        && !is_consent_host(url)
        && link_host(url).is_some()
}

/// Canonical article link embedded in an aggregator wrapper page.
///
/// Tries a `data-n-au` attribute, then a meta refresh target, then a
/// JSON-LD `url`.
pub fn canonical_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Ok(selector) = Selector::parse("[data-n-au]") {
        let found = document
            .select(&selector)
            .filter_map(|el| el.value().attr("data-n-au"))
            .find(|link| is_article_link(link));
        if let Some(link) = found {
            return Some(link.trim().to_string());
        }
    }

    if let Ok(selector) = Selector::parse("meta[http-equiv][content]") {
        for meta in document.select(&selector) {
            let is_refresh = meta
                .value()
                .attr("http-equiv")
                .is_some_and(|v| v.eq_ignore_ascii_case("refresh"));
            if !is_refresh {
                continue;
            }
            if let Some(link) = meta.value().attr("content").and_then(refresh_target) {
                if is_article_link(&link) {
                    return Some(link);
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("script[type='application/ld+json']") {
        for script in document.select(&selector) {
            let raw: String = script.text().collect();
            let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
                continue;
            };
            if let Some(link) = json_ld_url(&value) {
                return Some(link);
            }
        }
    }

    None
}

/// `<meta http-equiv="refresh" content="0;url=...">` target.
fn refresh_target(content: &str) -> Option<String> {
    let pattern = regex::Regex::new(r#"(?i)url\s*=\s*['"]?([^'"\s]+)"#).ok()?;
    let captures = pattern.captures(content)?;
    Some(captures.get(1)?.as_str().to_string())
}

fn json_ld_url(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(link) = map.get("url").and_then(|v| v.as_str()) {
                if is_article_link(link) {
                    return Some(link.to_string());
                }
            }
            map.get("@graph").and_then(json_ld_url)
        }
        serde_json::Value::Array(items) => items.iter().find_map(json_ld_url),
        _ => None,
    }
}

/// Main-body text of an HTML document, cleaned and truncated.
pub fn extract_main_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for region in document.select(&selector) {
            if EXCLUDED_TAGS.contains(&region.value().name()) {
                continue;
            }
            let text = normalize_whitespace(&visible_text(region));
            if text.chars().count() > MIN_REGION_CHARS {
                return finish(&text);
            }
        }
    }

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());
    finish(&normalize_whitespace(&visible_text(body)))
}

/// Text under `root`, skipping excluded subtrees.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    let mut stack: Vec<_> = root.children().collect();
    stack.reverse();

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(element) if EXCLUDED_TAGS.contains(&element.name()) => {}
            Node::Element(_) => {
                let mut children: Vec<_> = node.children().collect();
                children.reverse();
                stack.extend(children);
            }
            _ => {}
        }
    }
    out
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Printable ASCII, Latin-1 and Latin Extended-A letters, typographic
/// punctuation and the euro sign.
fn is_safe_char(c: char) -> bool {
    matches!(c,
        ' '..='~'
        | '\u{00A0}'..='\u{017F}'
        | '\u{2010}'..='\u{2027}'
        | '\u{20AC}')
}

fn finish(text: &str) -> Option<String> {
    let safe: String = text.chars().filter(|c| is_safe_char(*c)).collect();
    let cleaned = normalize_whitespace(&safe);
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.chars().count() > MAX_CONTENT_CHARS {
        let mut truncated: String = cleaned.chars().take(MAX_CONTENT_CHARS).collect();
        truncated.push_str("...");
        return Some(truncated);
    }
    Some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::traits::fetcher::MockPageFetcher;
    use mockall::predicate::eq;

    fn long_paragraph(word: &str) -> String {
        std::iter::repeat(word).take(60).collect::<Vec<_>>().join(" ")
    }

    fn article_page() -> String {
        format!(
            "<html><head><script>var tracking = 1;</script></head><body>\
             <nav>Home | Sport | Meteo</nav>\
             <article><h1>Terremoto in Calabria</h1><p>{}</p>\
             <aside>Leggi anche: altro</aside></article>\
             <footer>Copyright</footer></body></html>",
            long_paragraph("scossa")
        )
    }

    #[test]
    fn test_article_region_excludes_chrome() {
        let text = extract_main_text(&article_page()).unwrap();
        assert!(text.starts_with("Terremoto in Calabria scossa"));
        assert!(!text.contains("Leggi anche"));
        assert!(!text.contains("Home | Sport"));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_short_regions_fall_back_to_body() {
        let html = "<html><body><article>Breve.</article><div>Altro testo</div>\
                    <script>x()</script></body></html>";
        assert_eq!(extract_main_text(html).unwrap(), "Breve. Altro testo");
    }

    #[test]
    fn test_truncates_with_ellipsis() {
        let html = format!("<html><body><main>{}</main></body></html>", "parola ".repeat(2000));
        let text = extract_main_text(&html).unwrap();
        assert_eq!(text.chars().count(), MAX_CONTENT_CHARS + 3);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn test_keeps_accents_and_strips_unsafe() {
        let html = "<html><body><p>Perché è “vero” – città 5€ 🚀 日本</p></body></html>";
        assert_eq!(extract_main_text(html).unwrap(), "Perché è “vero” – città 5€");
    }

    #[test]
    fn test_empty_page_is_none() {
        assert_eq!(extract_main_text("<html><body><script>x()</script></body></html>"), None);
    }

    #[test]
    fn test_canonical_link_sources() {
        let attr = r#"<html><body><c-wiz data-n-au="https://www.ansa.it/a.html"></c-wiz></body></html>"#;
        assert_eq!(canonical_link(attr).as_deref(), Some("https://www.ansa.it/a.html"));

        let refresh = r#"<html><head><meta http-equiv="Refresh" content="0; url='https://www.corriere.it/b'"></head></html>"#;
        assert_eq!(canonical_link(refresh).as_deref(), Some("https://www.corriere.it/b"));

        let json_ld = r#"<html><head><script type="application/ld+json">{"@graph":[{"url":"https://news.google.com/x"},{"url":"https://www.bbc.com/c"}]}</script></head></html>"#;
        assert_eq!(canonical_link(json_ld).as_deref(), Some("https://www.bbc.com/c"));

        assert_eq!(canonical_link("<html><body>nothing</body></html>"), None);
    }

    #[tokio::test]
    async fn test_transport_error_is_none() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _| Err(FetchError::Http("connection refused".into())));
        let extractor = ContentExtractor::new(Arc::new(fetcher));
        assert_eq!(extractor.extract("https://www.ansa.it/a.html").await, None);
    }

    #[tokio::test]
    async fn test_plain_link_is_fetched_with_redirects() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .with(eq("https://www.ansa.it/a.html"), eq(true))
            .times(1)
            .returning(|url, _| Ok(FetchedPage::ok(url, article_page())));
        let extractor = ContentExtractor::new(Arc::new(fetcher));
        let text = extractor.extract("https://www.ansa.it/a.html").await.unwrap();
        assert!(text.contains("Terremoto in Calabria"));
    }

    #[tokio::test]
    async fn test_aggregator_consent_page_uses_location_header() {
        let wrapper = "https://news.google.com/rss/articles/CBMi123";
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .with(eq(wrapper), eq(true))
            .times(1)
            .returning(|_, _| {
                Ok(FetchedPage::ok(
                    "https://consent.google.com/ml?continue=x",
                    "<html>consent</html>",
                ))
            });
        fetcher
            .expect_fetch()
            .with(eq(wrapper), eq(false))
            .times(1)
            .returning(|url, _| {
                Ok(FetchedPage {
                    final_url: url.to_string(),
                    status: 302,
                    location: Some("https://www.repubblica.it/cronaca/1".into()),
                    body: String::new(),
                })
            });
        fetcher
            .expect_fetch()
            .with(eq("https://www.repubblica.it/cronaca/1"), eq(true))
            .times(1)
            .returning(|url, _| Ok(FetchedPage::ok(url, article_page())));

        let extractor = ContentExtractor::new(Arc::new(fetcher));
        let text = extractor.extract(wrapper).await.unwrap();
        assert!(text.contains("scossa"));
    }

    #[tokio::test]
    async fn test_aggregator_redirected_to_article_is_fetched_once() {
        let wrapper = "https://news.google.com/rss/articles/CBMi789";
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .with(eq(wrapper), eq(true))
            .times(1)
            .returning(|_, _| Ok(FetchedPage::ok("https://www.ansa.it/cronaca/2", article_page())));

        let extractor = ContentExtractor::new(Arc::new(fetcher));
        let text = extractor.extract(wrapper).await.unwrap();
        assert!(text.contains("Terremoto in Calabria"));
    }

    #[tokio::test]
    async fn test_aggregator_without_canonical_is_none() {
        let wrapper = "https://news.google.com/rss/articles/CBMi456";
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|url, _| Ok(FetchedPage::ok(url, "<html><body>wrapper</body></html>")));
        let extractor = ContentExtractor::new(Arc::new(fetcher));
        assert_eq!(extractor.extract(wrapper).await, None);
    }
}
