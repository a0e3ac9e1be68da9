//! HTTP API for the AI service

pub mod health;
pub mod inference;
pub mod jobs;

pub use health::health_routes;
pub use inference::inference_routes;
pub use jobs::job_routes;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AiError;

/// Unwrap a JSON body, reporting rejections as `{"error": ...}`
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AiError::BadRequest(rejection.body_text()))
}
