//! Page fetching on top of reqwest

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Response, header};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::extractor::content_extraction::{
    extract_title, normalize_whitespace, readable_text, selector_text, strip_boilerplate,
};
use crate::extractor::error::ExtractError;
use crate::extractor::{ContentExtractor, ExtractorConfig};

/// Fetches pages over HTTP and extracts their article text
#[derive(Debug, Clone)]
pub struct WebExtractor {
    client: ReqwestClient,
    config: ExtractorConfig,
}

impl WebExtractor {
    /// Create a new extractor with the given configuration
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetch `url` and extract its article text, reporting why it failed
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> Result<String, ExtractError> {
        let url = parse_page_url(url)?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status(status.as_u16()));
        }

        if let Some(content_type) = response.headers().get(header::CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default().to_ascii_lowercase();
            if !content_type.contains("html") {
                return Err(ExtractError::ContentType(content_type));
            }
        }

        let body = read_body(response, self.config.max_body_bytes).await?;
        let html = String::from_utf8_lossy(&body);
        debug!(
            "Fetched {} bytes, title: {:?}",
            html.len(),
            extract_title(&html)
        );

        self.extract_from_html(&html, &url)
    }

    /// Reduce an already fetched document to its article text
    pub fn extract_from_html(&self, html: &str, url: &Url) -> Result<String, ExtractError> {
        let min_chars = self.config.min_text_chars;
        let cleaned = strip_boilerplate(html, &self.config.exclude_selectors);

        let mut text = match readable_text(&cleaned, url) {
            Ok(text) => normalize_whitespace(&text),
            Err(e) => {
                debug!("Readability failed: {}", e);
                String::new()
            }
        };

        if text.chars().count() < min_chars {
            debug!("Readability found no article body, trying content selectors");
            if let Some(fallback) = selector_text(
                html,
                &self.config.content_selectors,
                &self.config.exclude_selectors,
            ) {
                if fallback.chars().count() > text.chars().count() {
                    text = fallback;
                }
            }
        }

        let chars = text.chars().count();
        if chars == 0 || chars < min_chars {
            debug!("Rejecting {} characters of text as too short for an article", chars);
            return Err(ExtractError::NoArticle);
        }
        Ok(text)
    }
}

/// Read the response body, giving up once it grows past `limit` bytes
async fn read_body(mut response: Response, limit: usize) -> Result<Vec<u8>, ExtractError> {
    if let Some(length) = response.content_length() {
        if length > limit as u64 {
            return Err(ExtractError::TooLarge(limit));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(ExtractError::TooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[async_trait]
impl ContentExtractor for WebExtractor {
    async fn fetch_main_content(&self, url: &str) -> Option<String> {
        match self.extract(url).await {
            Ok(text) => {
                debug!("Extracted {} characters of article text", text.chars().count());
                Some(text)
            }
            Err(e) => {
                warn!("Content extraction failed: {}", e);
                None
            }
        }
    }
}

fn parse_page_url(url: &str) -> Result<Url, ExtractError> {
    let url = Url::parse(url.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ExtractError::Scheme(other.to_string())),
    }
}
