//! # HTTP Server
//!
//! The axum boundary: `POST /summarize`, `GET /health`, and the static form
//! page for everything else.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{ApiKey, ServerConfig};
use crate::error::Result;
use crate::extractor::{ExtractorConfig, WebExtractor};
use crate::pipeline::{SummarizationRequest, SummarizationResult, SummarizePipeline};
use crate::summarizer::{GeminiSummarizer, SummarizerConfig};

/// Shown when the request body is not the expected JSON object
pub const MSG_INVALID_BODY: &str = "Invalid request body.";

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pipeline: SummarizePipeline,
}

impl AppState {
    pub fn new(pipeline: SummarizePipeline) -> Self {
        Self { pipeline }
    }

    /// Wire the production extractor and Gemini summarizer together
    pub fn from_config(
        api_key: ApiKey,
        extractor_config: ExtractorConfig,
        summarizer_config: SummarizerConfig,
    ) -> Result<Self> {
        let extractor = WebExtractor::new(extractor_config)?;
        let summarizer = GeminiSummarizer::new(api_key, summarizer_config)?;
        Ok(Self::new(SummarizePipeline::new(
            Arc::new(extractor),
            Arc::new(summarizer),
        )))
    }
}

/// Build the router
pub fn create_app(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/summarize", post(summarize_handler))
        .route("/health", get(health_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn start_server(config: ServerConfig, state: AppState) -> Result<()> {
    if !config.static_dir.is_dir() {
        warn!(
            "Static directory {} does not exist, the form page will not be served",
            config.static_dir.display()
        );
    }

    let app = create_app(state, &config.static_dir);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;

    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn summarize_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizationRequest>, JsonRejection>,
) -> (StatusCode, Json<SummarizationResult>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected summarize request body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(SummarizationResult::Failure {
                    error_message: MSG_INVALID_BODY.to_string(),
                }),
            );
        }
    };

    let (status, result) = state.pipeline.handle(request).await;
    (status, Json(result))
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
