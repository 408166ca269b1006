//! HTTP client implementation for the Gemini API
//!
//! This module provides the HTTP client for making requests to the Gemini API.

use crate::config::ApiKey;
use crate::error::{Error, Result};
use crate::gemini::types::HttpOptions;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Header carrying the API key. Sent as a header rather than a `key` query
/// parameter so that the key never appears in request URLs or their errors.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Upper bound on a server-requested Retry-After wait
const MAX_RETRY_AFTER_SECS: u64 = 10;

/// HTTP client for making requests to the Gemini API
///
/// Transient failures (HTTP 429, 5xx, connection problems and timeouts) are
/// retried up to `max_retries` times. Everything else is returned as-is.
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Base URL for API requests
    base_url: String,

    /// API key for authentication
    api_key: ApiKey,

    /// API version
    api_version: String,

    /// Maximum number of retry attempts after the first request
    max_retries: u32,

    /// Retry delay used when no Retry-After header is provided
    retry_delay: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with an API key and custom options
    pub fn with_api_key_and_options(api_key: ApiKey, options: HttpOptions) -> Result<Self> {
        let client = ReqwestClient::builder().timeout(options.timeout).build()?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            api_key,
            api_version: options.api_version,
            max_retries: options.max_retries,
            retry_delay: options.retry_delay,
        })
    }

    /// Build a URL for the Gemini Developer API
    fn build_url(&self, path: &str) -> Result<Url> {
        let url = format!("{}/{}/{}", self.base_url, self.api_version, path);
        Url::parse(&url).map_err(|e| Error::Other(format!("Invalid URL: {}", e)))
    }

    /// Send a POST request with a JSON body, retrying transient failures
    #[instrument(skip(self, body), level = "debug")]
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.build_url(path)?;
        let mut attempt = 0;

        loop {
            let request = self
                .client
                .post(url.clone())
                .header(API_KEY_HEADER, self.api_key.expose())
                .json(body);

            debug!("Sending POST request to {} (attempt {})", path, attempt + 1);
            match self.execute_request(request).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(&e);
                    warn!(
                        "Transient failure calling {}: {}. Retrying in {} ms ({}/{})",
                        path,
                        e,
                        delay.as_millis(),
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn delay_for(&self, err: &Error) -> Duration {
        match err {
            Error::RateLimit { retry_after_secs } => {
                Duration::from_secs((*retry_after_secs).min(MAX_RETRY_AFTER_SECS))
            }
            _ => self.retry_delay,
        }
    }

    /// Execute an HTTP request and handle the response
    async fn execute_request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        let status = response.status();
        let retry_after = retry_after_secs(&response);
        let response_text = response
            .text()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        if status.is_success() {
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse response: {}", e);
                Error::UnexpectedResponse(format!("Failed to parse response: {}", e))
            })
        } else {
            error!("API error: {} - {}", status, response_text);

            match status {
                StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimit {
                    retry_after_secs: retry_after.unwrap_or(self.retry_delay.as_secs()),
                }),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(Error::Auth("Invalid API key or credentials".to_string()))
                }
                _ => Err(Error::Api {
                    status_code: status.as_u16(),
                    message: response_text,
                }),
            }
        }
    }
}

fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde::Deserialize;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize)]
    struct TestResponse {
        message: String,
    }

    fn options(base_url: String, max_retries: u32) -> HttpOptions {
        HttpOptions {
            base_url,
            max_retries,
            retry_delay: Duration::from_millis(0),
            ..HttpOptions::default()
        }
    }

    fn client(base_url: String, max_retries: u32) -> HttpClient {
        HttpClient::with_api_key_and_options(
            ApiKey::new("test-key").unwrap(),
            options(base_url, max_retries),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_post_request_success() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1beta/test")
            .match_header(API_KEY_HEADER, "test-key")
            .match_body(Matcher::Json(serde_json::json!({"test": "data"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"message\": \"success\"}")
            .expect(1)
            .create_async()
            .await;

        let client = client(server.url(), 0);

        let body = serde_json::json!({"test": "data"});
        let response: TestResponse = client.post("test", &body).await.unwrap();
        assert_eq!(response.message, "success");

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1beta/test")
            .with_status(401)
            .with_body("{\"error\": {\"code\": 401}}")
            .expect(1)
            .create_async()
            .await;

        let client = client(server.url(), 3);

        let result: Result<TestResponse> = client.post("test", &serde_json::json!({})).await;
        assert!(matches!(result, Err(Error::Auth(_))));

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_retried_once_then_success() {
        let mut server = Server::new_async().await;

        let mock_failure = server
            .mock("POST", "/v1beta/test")
            .with_status(503)
            .with_body("Service Unavailable")
            .expect(1)
            .create_async()
            .await;

        let mock_success = server
            .mock("POST", "/v1beta/test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"message\": \"success after retry\"}")
            .expect(1)
            .create_async()
            .await;

        let client = client(server.url(), 1);

        let response: TestResponse = client.post("test", &serde_json::json!({})).await.unwrap();
        assert_eq!(response.message, "success after retry");

        mock_failure.assert_async().await;
        mock_success.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_max_retries_exceeded() {
        let mut server = Server::new_async().await;

        // Mock that always returns 429
        let mock_rate_limit = server.mock("POST", "/v1beta/test")
            .with_status(429)
            .with_header("retry-after", "1")
            .with_body("{\"error\": {\"code\": 429, \"message\": \"Resource has been exhausted\", \"status\": \"RESOURCE_EXHAUSTED\"}}")
            .expect(2) // Initial request + 1 retry
            .create_async().await;

        let client = client(server.url(), 1);

        let result: Result<TestResponse> = client.post("test", &serde_json::json!({})).await;
        assert!(matches!(
            result,
            Err(Error::RateLimit {
                retry_after_secs: 1
            })
        ));

        mock_rate_limit.assert_async().await;
    }

    #[tokio::test]
    async fn test_timeout_is_retried_then_surfaces() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(socket);
            }
        });

        let client = HttpClient::with_api_key_and_options(
            ApiKey::new("test-key").unwrap(),
            HttpOptions {
                timeout: Duration::from_millis(200),
                ..options(format!("http://{}", addr), 1)
            },
        )
        .unwrap();

        let result: Result<TestResponse> = client.post("test", &serde_json::json!({})).await;
        match result {
            Err(e @ Error::Http(_)) => {
                assert!(e.is_transient());
                if let Error::Http(inner) = &e {
                    assert!(inner.is_timeout());
                }
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_is_unexpected_response() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1beta/test")
            .with_status(200)
            .with_body("not json")
            .expect(1)
            .create_async()
            .await;

        let client = client(server.url(), 1);

        let result: Result<TestResponse> = client.post("test", &serde_json::json!({})).await;
        assert!(matches!(result, Err(Error::UnexpectedResponse(_))));

        mock_server.assert_async().await;
    }
}
