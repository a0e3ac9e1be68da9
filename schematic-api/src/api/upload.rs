//! Presigned upload
//!
//! The browser asks for an upload slot, receives a presigned PUT URL and
//! sends the PDF straight to object storage.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{json_body, AuthUser};
use crate::db::{schematics, users};
use crate::error::{ApiError, ApiResult};
use crate::storage::{build_schematic_key, sanitize_file_name};
use crate::AppState;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    /// Validated by [`file_size_bytes`]
    #[serde(default)]
    pub file_size: Option<Value>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub upload_url: String,
    pub schematic_id: String,
    pub key: String,
}

/// Byte count from a JSON number or numeric string
///
/// Fractions, zero, negatives and anything else give `None`.
fn file_size_bytes(value: &Value) -> Option<i64> {
    let size = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (size > 0).then_some(size)
}

/// POST /api/upload
pub async fn create_upload(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let request = json_body(payload)?;

    let file_size = request.file_size.as_ref().and_then(file_size_bytes);
    let (file_name, file_size) = match (request.file_name.as_deref(), file_size) {
        (Some(name), Some(size)) if !name.trim().is_empty() => (name, size),
        _ => {
            return Err(ApiError::BadRequest(
                "fileName and fileSize are required".to_string(),
            ))
        }
    };

    if request.content_type.as_deref() != Some(PDF_CONTENT_TYPE) {
        return Err(ApiError::BadRequest("Only PDF files are accepted".to_string()));
    }

    let tier = users::user_tier(&state.db, &auth.id).await?;
    let limits = tier.limits();

    if file_size > limits.max_file_size {
        return Err(ApiError::PayloadTooLarge(format!(
            "File size exceeds {} MB limit for your {} plan",
            limits.max_file_size_mb(),
            tier
        )));
    }

    let count = schematics::count_for_user(&state.db, &auth.id).await?;
    if !limits.allows_another(count) {
        // allows_another only refuses when there is a limit
        let max = limits.max_schematics.unwrap_or(count);
        return Err(ApiError::Forbidden(format!(
            "You have reached the {} schematic limit for your {} plan",
            max, tier
        )));
    }

    let file_name = sanitize_file_name(file_name);
    let schematic = schematics::insert_schematic(&state.db, &auth.id, &file_name, file_size).await?;

    let key = build_schematic_key(&auth.id, &schematic.id, &file_name);
    let upload_url = match state
        .store
        .presign_put(&key, PDF_CONTENT_TYPE, state.settings.presign_expiry)
    {
        Ok(url) => url,
        Err(e) => {
            // Do not leave a record the client can never upload to
            warn!(schematic_id = %schematic.id, error = %e, "Presigning failed, removing record");
            schematics::delete_schematic(&state.db, &schematic.id).await?;
            return Err(e.into());
        }
    };

    schematics::set_file_url(&state.db, &schematic.id, &key).await?;

    info!(
        schematic_id = %schematic.id,
        user_id = %auth.id,
        file_size = file_size,
        "Upload slot issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            upload_url,
            schematic_id: schematic.id,
            key,
        }),
    ))
}

pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/api/upload", post(create_upload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_size_accepts_whole_numbers() {
        assert_eq!(file_size_bytes(&json!(2048)), Some(2048));
        assert_eq!(file_size_bytes(&json!(2048.0)), Some(2048));
        assert_eq!(file_size_bytes(&json!("2048")), Some(2048));
        assert_eq!(file_size_bytes(&json!(" 2048 ")), Some(2048));
    }

    #[test]
    fn test_file_size_rejects_everything_else() {
        for value in [
            json!(1024.5),
            json!("1024.5"),
            json!("big"),
            json!(0),
            json!(-5),
            json!(null),
            json!(true),
            json!([1024]),
        ] {
            assert_eq!(file_size_bytes(&value), None, "{}", value);
        }
    }
}
