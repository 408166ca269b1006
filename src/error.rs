//! Error types for the pagegist crate

use thiserror::Error;

/// Result type for pagegist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pagegist operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Please retry after {retry_after_secs} seconds")]
    RateLimit {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Content extraction error
    #[error("Extract error: {0}")]
    Extract(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether a failed call is worth one more attempt.
    ///
    /// Quota exhaustion, server-side failures and transport problems
    /// (connection resets, timeouts) are transient. Auth failures and
    /// malformed responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RateLimit { .. } => true,
            Error::Api { status_code, .. } => *status_code >= 500,
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::RateLimit { retry_after_secs: 1 }.is_transient());
        assert!(
            Error::Api {
                status_code: 503,
                message: "unavailable".to_string()
            }
            .is_transient()
        );
        assert!(
            !Error::Api {
                status_code: 400,
                message: "bad request".to_string()
            }
            .is_transient()
        );
        assert!(!Error::Auth("invalid key".to_string()).is_transient());
        assert!(!Error::UnexpectedResponse("no candidates".to_string()).is_transient());
    }
}
