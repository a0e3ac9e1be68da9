//! Single-page inference endpoints
//!
//! Detection and OCR models are not wired in yet. Both endpoints accept the
//! full request shape and answer with empty results so callers can integrate
//! against the final contract.

use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use schematic_common::models::BoundingBox;

use super::json_body;
use crate::error::AiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub image_url: String,
    pub page_id: String,
}

/// One detected symbol
#[derive(Debug, Clone, Serialize)]
pub struct DetectedComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub ref_designator: Option<String>,
    pub confidence: f64,
    pub bbox: BoundingBox,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub page_id: String,
    pub components: Vec<DetectedComponent>,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct OcrRequest {
    pub image_url: String,
    /// Restrict recognition to this region of the image
    #[serde(default)]
    pub region: Option<BoundingBox>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecognizedText {
    pub text: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
}

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub text_blocks: Vec<RecognizedText>,
    pub message: &'static str,
}

/// POST /detect
pub async fn detect_components(
    body: Result<Json<DetectRequest>, JsonRejection>,
) -> AiResult<Json<DetectResponse>> {
    let request = json_body(body)?;
    debug!(page_id = %request.page_id, image_url = %request.image_url, "Detect request");

    Ok(Json(DetectResponse {
        page_id: request.page_id,
        components: Vec::new(),
        message: "Detection not yet implemented",
    }))
}

/// POST /ocr
pub async fn recognize_text(
    body: Result<Json<OcrRequest>, JsonRejection>,
) -> AiResult<Json<OcrResponse>> {
    let request = json_body(body)?;
    debug!(image_url = %request.image_url, region = ?request.region, "OCR request");

    Ok(Json(OcrResponse {
        text_blocks: Vec::new(),
        message: "OCR not yet implemented",
    }))
}

pub fn inference_routes() -> Router<AppState> {
    Router::new()
        .route("/detect", post(detect_components))
        .route("/ocr", post(recognize_text))
}
