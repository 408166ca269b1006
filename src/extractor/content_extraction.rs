//! Content extraction functionality for the extractor module

use crate::extractor::error::ExtractError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::io::Cursor;
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));
static LINE_EDGE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ | $").expect("valid regex"));
static BLANK_LINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Elements that end a line of text when flattened
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table", "td", "th",
    "tr", "ul",
];

/// Run the readability algorithm over a document and return its article text
///
/// # Arguments
///
/// * `html` - The raw HTML of the page
/// * `url` - The page URL, used to resolve relative links
///
/// # Returns
///
/// The article text, not yet normalized. May be empty when the page has no body.
pub fn readable_text(html: &str, url: &Url) -> Result<String, ExtractError> {
    let mut cursor = Cursor::new(html.as_bytes());
    let product = readability::extractor::extract(&mut cursor, url)
        .map_err(|e| ExtractError::HtmlParse(format!("{:?}", e)))?;
    Ok(product.text)
}

/// Remove every element matching an exclude selector from a document
///
/// Navigation, headers, footers and similar chrome are dropped before the
/// readability pass, so a page made only of boilerplate reduces to an empty
/// body instead of being mistaken for an article.
///
/// # Arguments
///
/// * `html` - The raw HTML of the page
/// * `exclude_selectors` - CSS selectors for elements to remove
///
/// # Returns
///
/// The serialized document without the excluded subtrees
pub fn strip_boilerplate(html: &str, exclude_selectors: &[String]) -> String {
    let mut document = Html::parse_document(html);
    let excluded = parse_selectors(exclude_selectors);

    let ids: Vec<_> = excluded
        .iter()
        .flat_map(|selector| document.select(selector).map(|element| element.id()))
        .collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document.html()
}

/// Gather text from the first content selector that matches anything
///
/// # Arguments
///
/// * `html` - The HTML to search
/// * `content_selectors` - CSS selectors for content to include, tried in order
/// * `exclude_selectors` - CSS selectors for elements to skip
///
/// # Returns
///
/// The flattened text of the matching elements, or `None` if no selector
/// produced any non-blank text
pub fn selector_text(
    html: &str,
    content_selectors: &[String],
    exclude_selectors: &[String],
) -> Option<String> {
    let document = Html::parse_document(html);
    let excluded = parse_selectors(exclude_selectors);

    for selector_str in content_selectors {
        let selector = match Selector::parse(selector_str) {
            Ok(selector) => selector,
            Err(e) => {
                warn!("Failed to parse selector '{}': {:?}", selector_str, e);
                continue;
            }
        };

        let mut text = String::new();
        for element in document.select(&selector) {
            // Nested matches are already covered by their outermost ancestor
            let nested = element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| selector.matches(&ancestor));
            if nested {
                continue;
            }
            collect_text(element, &excluded, &mut text);
            text.push('\n');
        }

        let text = normalize_whitespace(&text);
        if !text.is_empty() {
            return Some(text);
        }
    }

    None
}

fn parse_selectors(selectors: &[String]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!("Failed to parse selector '{}': {:?}", s, e);
                None
            }
        })
        .collect()
}

fn collect_text(element: ElementRef<'_>, excluded: &[Selector], out: &mut String) {
    if excluded.iter().any(|selector| selector.matches(&element)) {
        return;
    }

    let is_block = BLOCK_ELEMENTS.contains(&element.value().name());
    if is_block {
        out.push('\n');
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, excluded, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }

    if is_block {
        out.push('\n');
    }
}

/// Collapse runs of horizontal whitespace, strip line edges, and keep at
/// most one blank line between paragraphs
pub fn normalize_whitespace(text: &str) -> String {
    let text = HORIZONTAL_SPACE.replace_all(text, " ");
    let text = LINE_EDGE_SPACE.replace_all(&text, "");
    let text = BLANK_LINE_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Extract the document title
///
/// # Arguments
///
/// * `html` - The HTML of the page
///
/// # Returns
///
/// The trimmed contents of `<title>`, if present and non-empty
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ExtractorConfig;

    const ARTICLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head><title>  Test Article  </title></head>
        <body>
            <nav>Home | About | Contact</nav>
            <article>
                <h1>Main Article Title</h1>
                <p>This is the main content of the article. It contains important information
                that should be extracted by the readability algorithm.</p>
                <aside>Related: ten other things</aside>
                <p>Here is another paragraph with more content to ensure proper extraction.</p>
            </article>
            <footer>Footer content here</footer>
        </body>
        </html>
    "#;

    #[test]
    fn test_readable_text_finds_article() {
        let url = Url::parse("https://example.com/article").unwrap();
        let text = readable_text(ARTICLE_HTML, &url).unwrap();
        assert!(text.contains("main content of the article"));
    }

    #[test]
    fn test_selector_text_skips_excluded_elements() {
        let config = ExtractorConfig::default();
        let text = selector_text(
            ARTICLE_HTML,
            &config.content_selectors,
            &config.exclude_selectors,
        )
        .unwrap();

        assert!(text.starts_with("Main Article Title"));
        assert!(text.contains("another paragraph with more content"));
        assert!(!text.contains("Related: ten other things"));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("Footer content"));
    }

    #[test]
    fn test_strip_boilerplate_removes_excluded_elements() {
        let config = ExtractorConfig::default();
        let cleaned = strip_boilerplate(ARTICLE_HTML, &config.exclude_selectors);

        assert!(cleaned.contains("main content of the article"));
        assert!(!cleaned.contains("Home | About"));
        assert!(!cleaned.contains("Related: ten other things"));
        assert!(!cleaned.contains("Footer content"));
    }

    #[test]
    fn test_strip_boilerplate_leaves_empty_body_for_chrome_only_page() {
        let html = "<html><body><nav><a>Home</a> <a>About</a></nav><footer>(c) 2024</footer></body></html>";
        let config = ExtractorConfig::default();
        let cleaned = strip_boilerplate(html, &config.exclude_selectors);

        let text: String = Html::parse_document(&cleaned).root_element().text().collect();
        assert!(text.trim().is_empty());
    }

    #[test]
    fn test_selector_text_none_without_matches() {
        let html = "<html><body><div>Just a div</div></body></html>";
        let selectors = vec!["article".to_string(), "main".to_string()];
        assert!(selector_text(html, &selectors, &[]).is_none());
    }

    #[test]
    fn test_selector_text_ignores_invalid_selector() {
        let html = "<html><body><main><p>Kept text</p></main></body></html>";
        let selectors = vec!["[[invalid".to_string(), "main".to_string()];
        assert_eq!(selector_text(html, &selectors, &[]).as_deref(), Some("Kept text"));
    }

    #[test]
    fn test_normalize_whitespace() {
        let raw = "  First\t\tline  \n\n\n\n  Second   line \n";
        assert_eq!(normalize_whitespace(raw), "First line\n\nSecond line");
        assert_eq!(normalize_whitespace(" \n\t \n"), "");
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title(ARTICLE_HTML).as_deref(), Some("Test Article"));
        assert_eq!(extract_title("<html><head></head></html>"), None);
    }
}
