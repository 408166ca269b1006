//! # pagegist Server
//!
//! Command-line entry point. Parses configuration from flags and environment
//! variables, sets up logging, and serves the summarization endpoint together
//! with the static form page.
//!
//! The Gemini API key is required. Without it the process exits with a
//! non-zero status before binding any socket.

mod telemetry;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use pagegist::config::{ApiKey, ServerConfig};
use pagegist::extractor::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MIN_TEXT_CHARS, ExtractorConfig};
use pagegist::server::{AppState, start_server};
use pagegist::summarizer::SummarizerConfig;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Summarize a web page in one line with Gemini", long_about = None)]
struct Cli {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: ApiKey,

    /// Address to listen on
    #[arg(short, long, env = "PAGEGIST_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Gemini model used for summaries
    #[arg(short, long, env = "PAGEGIST_MODEL", default_value = "gemini-1.5-flash")]
    model: String,

    /// Directory with the form page, stylesheet and client script
    #[arg(short, long, env = "PAGEGIST_STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Timeout in seconds for fetching the page
    #[arg(long, default_value = "15")]
    fetch_timeout_secs: u64,

    /// Pages with less article text than this are rejected
    #[arg(long, default_value_t = DEFAULT_MIN_TEXT_CHARS)]
    min_article_chars: usize,

    /// Largest page body that will be downloaded, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_page_bytes: usize,

    /// Timeout in seconds for each summarization call
    #[arg(long, default_value = "60")]
    summarize_timeout_secs: u64,

    /// Retries for transient summarization failures
    #[arg(long, default_value = "1")]
    summarize_retries: u32,

    /// Export traces and metrics over OTLP
    #[arg(long, env = "PAGEGIST_OTLP")]
    otlp: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _otel = telemetry::init_tracing_subscriber(cli.otlp)?;

    let extractor_config = ExtractorConfig::builder()
        .timeout(Duration::from_secs(cli.fetch_timeout_secs))
        .min_text_chars(cli.min_article_chars)
        .max_body_bytes(cli.max_page_bytes)
        .build();

    let summarizer_config = SummarizerConfig {
        model: cli.model,
        timeout: Duration::from_secs(cli.summarize_timeout_secs),
        max_retries: cli.summarize_retries,
        ..SummarizerConfig::default()
    };

    let server_config = ServerConfig {
        bind: cli.bind,
        static_dir: cli.static_dir,
    };

    info!(
        "Using model {} (fetch timeout {}s, summarize timeout {}s)",
        summarizer_config.model, cli.fetch_timeout_secs, cli.summarize_timeout_secs
    );

    let state = AppState::from_config(cli.api_key, extractor_config, summarizer_config)?;
    start_server(server_config, state).await?;

    Ok(())
}
