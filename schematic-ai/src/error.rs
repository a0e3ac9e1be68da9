//! Error types for the AI service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// AI service error type
#[derive(Debug, Error)]
pub enum AiError {
    /// Unknown job (404)
    #[error("{0}")]
    NotFound(String),

    /// Malformed or incomplete request (400)
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for AiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AiResult<T> = Result<T, AiError>;
