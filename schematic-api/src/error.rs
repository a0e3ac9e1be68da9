//! Error types for the web API
//!
//! Every error renders as `{"error": "<message>"}`. Server-side failures are
//! logged with their cause and reported to the client only as
//! `Internal server error`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ai_client::AiClientError;
use crate::storage::StorageError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, unknown or expired session (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad credentials on login (401)
    #[error("{0}")]
    InvalidCredentials(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Plan limit reached (403)
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Conflict (409), e.g. schematic already processing
    #[error("{0}")]
    Conflict(String),

    /// Upload exceeds plan size (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// AI service unreachable or failed (502)
    #[error("AI service error: {0}")]
    AiService(#[from] AiClientError),

    /// Object storage failure (500)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Database failure (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Shared library failure (500)
    #[error("Common error: {0}")]
    Common(#[from] schematic_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::InvalidCredentials(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::AiService(ref err) => {
                tracing::error!(error = %err, "AI service request failed");
                (StatusCode::BAD_GATEWAY, format!("AI service error: {}", err))
            }
            ref err @ (ApiError::Storage(_)
            | ApiError::Database(_)
            | ApiError::Common(_)) => {
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
