//! # Summarization Request Orchestrator
//!
//! Runs one request through the pipeline:
//! `Validating -> Extracting -> Truncating -> Summarizing -> Responded`.
//!
//! Each request is independent. The pipeline holds only shared, read-only
//! handles to the extraction and summarization capabilities, so it can be
//! cloned freely into every request handler.
//!
//! Failures end the request immediately. Validation and extraction failures
//! are client errors (400); summarization failures are server errors (500).
//! Only the short messages below ever reach the client, the cause is logged.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::extractor::ContentExtractor;
use crate::summarizer::Summarizer;

/// Maximum number of characters (Unicode scalar values) sent for summarization
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Appended to text cut at [`MAX_CONTENT_CHARS`]
pub const TRUNCATION_MARKER: &str = "...";

/// Instruction placed before the article text
pub const SUMMARY_INSTRUCTION: &str = "Summarize the following text in one line.";

/// Shown when the request carries no URL
pub const MSG_ENTER_URL: &str = "Please enter a URL.";

/// Shown when the page could not be fetched or has no article text
pub const MSG_EXTRACTION_FAILED: &str = "Could not extract content from the given URL.";

/// Shown for every server-side failure
pub const MSG_SERVER_ERROR: &str = "A server error occurred.";

/// Body of `POST /summarize`. A missing or null `url` counts as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummarizationRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl SummarizationRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

/// Outcome of a request, serialized as `{"summary": ..}` or `{"error": ..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SummarizationResult {
    Summary {
        summary: String,
    },
    Failure {
        #[serde(rename = "error")]
        error_message: String,
    },
}

/// Pipeline stage, attached to log events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Extracting,
    Truncating,
    Summarizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Extracting => "extracting",
            Stage::Truncating => "truncating",
            Stage::Summarizing => "summarizing",
        };
        f.write_str(name)
    }
}

/// Why a request failed
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Empty or missing URL
    #[error("no URL given")]
    Validation,

    /// Fetch failure, non-2xx status, or no article body
    #[error("no content could be extracted")]
    Extraction,

    /// The summarization API call failed
    #[error("summarization failed: {0}")]
    Summarization(#[source] crate::error::Error),
}

impl SummarizeError {
    /// HTTP status reported at the boundary
    pub fn status(&self) -> StatusCode {
        match self {
            SummarizeError::Validation | SummarizeError::Extraction => StatusCode::BAD_REQUEST,
            SummarizeError::Summarization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The user-safe message for the client
    pub fn user_message(&self) -> &'static str {
        match self {
            SummarizeError::Validation => MSG_ENTER_URL,
            SummarizeError::Extraction => MSG_EXTRACTION_FAILED,
            SummarizeError::Summarization(_) => MSG_SERVER_ERROR,
        }
    }

    /// The stage the request was in when it failed
    pub fn stage(&self) -> Stage {
        match self {
            SummarizeError::Validation => Stage::Validating,
            SummarizeError::Extraction => Stage::Extracting,
            SummarizeError::Summarization(_) => Stage::Summarizing,
        }
    }
}

/// Cut `text` to its first `max_chars` characters plus [`TRUNCATION_MARKER`].
/// Text at or under the bound is returned unchanged.
pub fn truncate_content(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_MARKER)),
        None => Cow::Borrowed(text),
    }
}

/// The prompt sent to the summarizer
pub fn build_prompt(text: &str) -> String {
    format!("{}\n\n{}", SUMMARY_INSTRUCTION, text)
}

/// Fetch, extract, truncate and summarize
#[derive(Clone)]
pub struct SummarizePipeline {
    extractor: Arc<dyn ContentExtractor>,
    summarizer: Arc<dyn Summarizer>,
}

impl SummarizePipeline {
    pub fn new(extractor: Arc<dyn ContentExtractor>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            extractor,
            summarizer,
        }
    }

    /// Run the pipeline for one URL
    #[instrument(skip(self))]
    pub async fn summarize_url(&self, url: &str) -> Result<String, SummarizeError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SummarizeError::Validation);
        }

        info!(stage = %Stage::Extracting, "Fetching page");
        let content = self
            .extractor
            .fetch_main_content(url)
            .await
            .ok_or(SummarizeError::Extraction)?;

        let text = truncate_content(&content, MAX_CONTENT_CHARS);
        if let Cow::Owned(_) = text {
            info!(
                stage = %Stage::Truncating,
                "Truncated article text to {} characters",
                MAX_CONTENT_CHARS
            );
        }

        info!(stage = %Stage::Summarizing, "Requesting summary");
        self.summarizer
            .summarize(&build_prompt(&text))
            .await
            .map_err(SummarizeError::Summarization)
    }

    /// Handle a request and shape the outcome for the HTTP boundary
    pub async fn handle(&self, request: SummarizationRequest) -> (StatusCode, SummarizationResult) {
        let url = request.url.unwrap_or_default();
        match self.summarize_url(&url).await {
            Ok(summary) => (StatusCode::OK, SummarizationResult::Summary { summary }),
            Err(e) => {
                if e.status().is_server_error() {
                    error!(stage = %e.stage(), error = ?e, "Summarization request failed");
                } else {
                    warn!(stage = %e.stage(), "Summarization request rejected: {}", e);
                }
                (
                    e.status(),
                    SummarizationResult::Failure {
                        error_message: e.user_message().to_string(),
                    },
                )
            }
        }
    }
}
