//! Error types for the extractor module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for extractor operations
#[derive(Debug, Error)]
pub enum ExtractError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The page answered with a non-success status
    #[error("Page returned HTTP status {0}")]
    Status(u16),

    /// The page is not an HTML document
    #[error("Unsupported content type: {0}")]
    ContentType(String),

    /// HTML parsing error
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// The page body is larger than the configured limit
    #[error("Page body exceeds {0} bytes")]
    TooLarge(usize),

    /// No article body could be identified
    #[error("No article text found")]
    NoArticle,

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// URL with a scheme other than http or https
    #[error("Unsupported URL scheme: {0}")]
    Scheme(String),
}

impl From<ExtractError> for CrateError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Http(e) => CrateError::Http(e),
            _ => CrateError::Extract(err.to_string()),
        }
    }
}
