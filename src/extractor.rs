//! # Content Fetcher & Extractor
//!
//! Given a URL, retrieves the page and reduces it to its primary text,
//! discarding navigation and other boilerplate.
//!
//! ## Key Components
//!
//! - `ContentExtractor`: the capability the summarization pipeline depends on
//! - `WebExtractor`: fetches over HTTP, strips page chrome and runs readability
//!   on what is left
//! - `ExtractorConfig`: timeout, user agent, selectors and size limits
//!
//! Every failure (bad URL, unreachable host, non-2xx status, non-HTML or
//! oversized body, missing or too-short article) is logged and reported to
//! callers as `None`.

mod config;
mod content_extraction;
mod error;
mod fetcher;

pub use config::{
    DEFAULT_MAX_BODY_BYTES, DEFAULT_MIN_TEXT_CHARS, ExtractorConfig, ExtractorConfigBuilder,
};
pub use error::ExtractError;
pub use fetcher::WebExtractor;

use async_trait::async_trait;

/// Reduces a web page to its main readable text
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Fetch `url` and return its article text, or `None` if the page could
    /// not be fetched or has no identifiable article body
    async fn fetch_main_content(&self, url: &str) -> Option<String>;
}
