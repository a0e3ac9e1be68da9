//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// Whether processing fabricates results instead of calling the AI service
    pub mock_processing: bool,
}

/// GET /health (no authentication)
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "schematic-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mock_processing: state.settings.use_mock,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
