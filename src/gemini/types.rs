//! Type definitions for the Gemini API
//!
//! This module contains the request and response structures used by the
//! `generateContent` endpoint.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Content represents a piece of content that can be processed by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// The role of the content (e.g., "user", "model")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// The parts that make up this content
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Default for Content {
    fn default() -> Self {
        Self::new()
    }
}

impl Content {
    /// Create a new empty content
    pub fn new() -> Self {
        Self {
            role: None,
            parts: Vec::new(),
        }
    }

    /// Set the role for this content
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Add text to this content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::text(text));
        self
    }
}

/// A part of content. Only text parts are produced or consumed here; other
/// part kinds in a response deserialize with `text: None` and are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Part {
    /// Text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Generation configuration for content generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Temperature controls randomness in generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Candidate count for multiple generations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<i32>,
}

/// Response from content generation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// The generated candidates
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Prompt feedback
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Get the concatenated text of the first candidate, if it has any
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

/// A candidate response from the model
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of the candidate
    pub content: Option<Content>,

    /// Finish reason
    pub finish_reason: Option<String>,
}

/// Feedback about the prompt
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked, if it was
    pub block_reason: Option<String>,
}

/// HTTP options for the Gemini client
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Base URL of the API
    pub base_url: String,

    /// API version
    pub api_version: String,

    /// Timeout for a single request
    pub timeout: Duration,

    /// Retries after the first attempt for transient failures
    pub max_retries: u32,

    /// Delay before a retry when the server gives no Retry-After
    pub retry_delay: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_version: "v1beta".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}
