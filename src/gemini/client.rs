//! Client implementation for the Gemini API
//!
//! This module provides the main client interface for interacting with the Gemini API.

use crate::config::ApiKey;
use crate::error::Result;
use crate::gemini::http::HttpClient;
use crate::gemini::models::ModelsService;
use crate::gemini::types::HttpOptions;

/// Client for the Gemini Developer API
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct Client {
    http_client: HttpClient,
}

impl Client {
    /// Create a new client with custom HTTP options
    pub fn with_options(api_key: ApiKey, options: HttpOptions) -> Result<Self> {
        let http_client = HttpClient::with_api_key_and_options(api_key, options)?;
        Ok(Self { http_client })
    }

    /// Access the models service
    pub fn models(&self) -> ModelsService {
        ModelsService::new(self.http_client.clone())
    }
}
