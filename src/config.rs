//! # Process Configuration
//!
//! Settings read once at startup and shared read-only for the lifetime of the
//! process. Component-specific settings live next to their components
//! (`extractor::ExtractorConfig`, `summarizer::SummarizerConfig`); this module
//! holds the API credential and the HTTP boundary settings.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

/// Gemini API key.
///
/// The value is only reachable through [`ApiKey::expose`]; `Debug` and
/// `Display` print a placeholder so the key cannot end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    /// Wrap a key, rejecting blank values
    pub fn new(key: impl AsRef<str>) -> Result<Self, Error> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }
        Ok(Self(Arc::from(key)))
    }

    /// The raw key, for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl FromStr for ApiKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: SocketAddr,

    /// Directory holding the form page, stylesheet and client script
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: PathBuf::from("static"),
        }
    }
}
