//! # Summarization Capability
//!
//! The external service that turns a prompt into a condensed summary. The
//! pipeline only sees the `Summarizer` trait; `GeminiSummarizer` is the
//! production implementation backed by the Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::config::ApiKey;
use crate::error::{Error, Result};
use crate::gemini::Client;
use crate::gemini::prelude::{Content, GenerationConfig, HttpOptions};

/// Turns a prompt into a summary
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Send `prompt` (instruction plus text) and return the model's answer
    async fn summarize(&self, prompt: &str) -> Result<String>;
}

/// Configuration for the Gemini summarizer
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Gemini model to use
    pub model: String,

    /// Timeout for a single API call
    pub timeout: Duration,

    /// Retries after the first attempt for transient failures
    pub max_retries: u32,

    /// Base URL of the Gemini API
    pub base_url: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        let http = HttpOptions::default();
        Self {
            model: "gemini-1.5-flash".to_string(),
            timeout: http.timeout,
            max_retries: http.max_retries,
            base_url: http.base_url,
        }
    }
}

/// Summarizer backed by the Gemini API
#[derive(Clone)]
pub struct GeminiSummarizer {
    client: Client,
    model: String,
}

impl GeminiSummarizer {
    /// Create a summarizer from an API key and configuration
    pub fn new(api_key: ApiKey, config: SummarizerConfig) -> Result<Self> {
        let options = HttpOptions {
            base_url: config.base_url,
            timeout: config.timeout,
            max_retries: config.max_retries,
            ..HttpOptions::default()
        };
        Ok(Self {
            client: Client::with_options(api_key, options)?,
            model: config.model,
        })
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.chars().count()))]
    async fn summarize(&self, prompt: &str) -> Result<String> {
        let content = Content::new().with_role("user").with_text(prompt);
        let config = GenerationConfig {
            candidate_count: Some(1),
            ..GenerationConfig::default()
        };

        let response = self
            .client
            .models()
            .generate_content_with_config(&self.model, None, vec![content], Some(config))
            .await?;

        let summary = response.text().map(|text| text.trim().to_string());
        match summary {
            Some(summary) if !summary.is_empty() => {
                debug!("Received summary of length {}", summary.len());
                Ok(summary)
            }
            _ => {
                let block_reason = response
                    .prompt_feedback
                    .and_then(|feedback| feedback.block_reason);
                warn!("Model returned no summary text (block reason: {:?})", block_reason);
                Err(Error::UnexpectedResponse(
                    "model returned no summary text".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn summarizer(base_url: String) -> GeminiSummarizer {
        let config = SummarizerConfig {
            model: "gemini-test".to_string(),
            base_url,
            max_retries: 0,
            ..SummarizerConfig::default()
        };
        GeminiSummarizer::new(ApiKey::new("test-key").unwrap(), config).unwrap()
    }

    #[tokio::test]
    async fn test_summarize_returns_trimmed_text() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Summarize this."}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates": [{"content": {"parts": [{"text": "  A one-line summary.\n"}]}, "finishReason": "STOP"}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let summary = summarizer(server.url())
            .summarize("Summarize this.")
            .await
            .unwrap();
        assert_eq!(summary, "A one-line summary.");

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create_async()
            .await;

        let result = summarizer(server.url()).summarize("text").await;
        assert!(matches!(result, Err(Error::UnexpectedResponse(_))));
    }

    #[tokio::test]
    async fn test_quota_error_is_propagated() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(429)
            .with_body(r#"{"error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}}"#)
            .create_async()
            .await;

        let result = summarizer(server.url()).summarize("text").await;
        assert!(matches!(result, Err(Error::RateLimit { .. })));
    }
}
