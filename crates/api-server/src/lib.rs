pub mod analyze_routes;
pub mod health_routes;

use analysis_core::{AnalysisError, FilingAnalyzer};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use llm_client::{ExtractionError, LlmClient};
use ratio_analysis::RatioAnalysisEngine;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<LlmClient>,
    pub analyzer: Arc<dyn FilingAnalyzer>,
}

impl AppState {
    pub fn from_env() -> Self {
        Self {
            llm: Arc::new(LlmClient::with_defaults()),
            analyzer: Arc::new(RatioAnalysisEngine::new()),
        }
    }
}

/// Handler errors, rendered as `{"error": …}` with the matching status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Extraction(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Analysis(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error calculating ratios: {e}"),
            ),
            AppError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing file: {e}"),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:8080"),
            HeaderValue::from_static("http://127.0.0.1:8080"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let max_upload = std::env::var("MAX_UPLOAD_BYTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

    Router::new()
        .merge(analyze_routes::analyze_routes())
        .merge(health_routes::health_routes())
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::from_env();
    if !state.llm.has_gemini() && !state.llm.has_openrouter() {
        tracing::warn!("no LLM provider configured; /api/analyze will return errors");
    }

    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let app = create_app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("FilingIQ API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        let response = AppError::BadRequest("No file part".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn extraction_errors_map_to_400() {
        let response =
            AppError::Extraction(ExtractionError::MissingApiKey("Gemini")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_map_to_500() {
        let response = AppError::Internal(anyhow::anyhow!("disk full")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
