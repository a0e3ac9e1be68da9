//! Health check endpoint

use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "smart-schematic-ai",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
