//! # Extractor Configuration Module
//!
//! Configuration for fetching a page and reducing it to its main text. Uses a
//! builder pattern for flexible configuration.
//!
//! ## Features
//!
//! - Explicit fetch timeout
//! - User-agent customization
//! - Fallback content selection via CSS selectors
//! - Exclusion patterns for boilerplate content (navigation, headers, footers)
//! - Minimum article length and maximum page size

use std::time::Duration;

/// Configuration for the content extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Timeout for fetching a page, covering connect and body read
    pub timeout: Duration,

    /// User agent to use for requests
    pub user_agent: String,

    /// CSS selectors tried in order when readability finds no article body
    pub content_selectors: Vec<String>,

    /// CSS selectors for elements to exclude from the fallback
    pub exclude_selectors: Vec<String>,

    /// Minimum number of characters for extracted text to count as an article
    pub min_text_chars: usize,

    /// Largest page body that will be read, in bytes
    pub max_body_bytes: usize,
}

/// Default minimum article length in characters
pub const DEFAULT_MIN_TEXT_CHARS: usize = 200;

/// Default page size limit (5 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: format!("pagegist/{}", env!("CARGO_PKG_VERSION")),
            content_selectors: vec![
                "article".to_string(),
                "main".to_string(),
                "[role=main]".to_string(),
            ],
            exclude_selectors: vec![
                "nav".to_string(),
                "header".to_string(),
                "footer".to_string(),
                "aside".to_string(),
                "script".to_string(),
                "style".to_string(),
                "noscript".to_string(),
                ".navigation".to_string(),
                ".menu".to_string(),
                ".sidebar".to_string(),
                ".ads".to_string(),
                ".comments".to_string(),
                "#comments".to_string(),
            ],
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Builder for ExtractorConfig
#[derive(Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ExtractorConfig::default(),
        }
    }

    /// Set the fetch timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the minimum article length in characters
    pub fn min_text_chars(mut self, min_text_chars: usize) -> Self {
        self.config.min_text_chars = min_text_chars;
        self
    }

    /// Set the page size limit in bytes
    pub fn max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.config.max_body_bytes = max_body_bytes;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}

impl ExtractorConfig {
    /// Create a new builder
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = ExtractorConfig::builder()
            .timeout(Duration::from_secs(3))
            .user_agent("test-agent")
            .min_text_chars(50)
            .max_body_bytes(2048)
            .build();

        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.min_text_chars, 50);
        assert_eq!(config.max_body_bytes, 2048);
        assert!(config.exclude_selectors.contains(&"nav".to_string()));
    }

    #[test]
    fn test_defaults_require_a_real_article() {
        let config = ExtractorConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.min_text_chars, DEFAULT_MIN_TEXT_CHARS);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }
}
