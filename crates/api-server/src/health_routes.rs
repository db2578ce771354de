use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub providers: ProviderStatus,
}

#[derive(Serialize)]
pub struct ProviderStatus {
    pub gemini: bool,
    pub openrouter: bool,
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        providers: ProviderStatus {
            gemini: state.llm.has_gemini(),
            openrouter: state.llm.has_openrouter(),
        },
    })
}
