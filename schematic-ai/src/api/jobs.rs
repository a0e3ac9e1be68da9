//! Processing jobs: submit and poll

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use schematic_common::ai::{JobStatus, ProcessRequest};

use super::json_body;
use crate::error::{AiError, AiResult};
use crate::pipeline::run_pipeline;
use crate::AppState;

/// POST /process
///
/// Registers a QUEUED job and runs the pipeline as a background task.
pub async fn submit_job(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> AiResult<Json<JobStatus>> {
    let request = json_body(body)?;
    let job = state.jobs.enqueue().await;

    info!(
        job_id = %job.job_id,
        schematic_id = %request.schematic_id,
        file_url = %request.file_url,
        "Job queued"
    );

    let job_id = job.job_id.clone();
    tokio::spawn(run_pipeline(state, job_id, request));

    Ok(Json(job))
}

/// GET /status/:job_id
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AiResult<Json<JobStatus>> {
    state
        .jobs
        .get(&job_id)
        .await
        .map(Json)
        .ok_or_else(|| AiError::NotFound("Job not found".to_string()))
}

pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/process", post(submit_job))
        .route("/status/:job_id", get(job_status))
}
