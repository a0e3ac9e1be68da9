//! HTTP API handlers for schematic-api

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod process;
pub mod schematics;
pub mod search;
pub mod upload;

pub use auth::{auth_middleware, auth_routes, session_routes, AuthUser};
pub use dashboard::dashboard_routes;
pub use health::health_routes;
pub use process::process_routes;
pub use schematics::schematic_routes;
pub use search::search_routes;
pub use upload::upload_routes;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::ApiError;

/// Unwrap a JSON body, reporting malformed bodies as `{"error": ...}` 400s
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}
