//! # pagegist - One-line Web Page Summaries
//!
//! This crate takes a web page URL, fetches the page, extracts its main
//! readable text, and asks Google's Gemini API for a one-line summary.
//!
//! ## Features
//!
//! - Readability-based article extraction with a CSS selector fallback
//! - Length bound on the text sent for summarization
//! - Gemini client with explicit timeouts and a bounded retry
//! - Injectable extraction and summarization capabilities for testing
//! - Small axum server with a JSON endpoint and a static form page
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pagegist::config::ApiKey;
//! use pagegist::extractor::{ExtractorConfig, WebExtractor};
//! use pagegist::pipeline::SummarizePipeline;
//! use pagegist::summarizer::{GeminiSummarizer, SummarizerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_key: ApiKey = std::env::var("GEMINI_API_KEY")?.parse()?;
//!     let pipeline = SummarizePipeline::new(
//!         Arc::new(WebExtractor::new(ExtractorConfig::default())?),
//!         Arc::new(GeminiSummarizer::new(api_key, SummarizerConfig::default())?),
//!     );
//!
//!     let summary = pipeline.summarize_url("https://example.com/article").await?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```

mod error;

pub mod config;
pub mod extractor;
pub mod gemini;
pub mod pipeline;
pub mod server;
pub mod summarizer;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
