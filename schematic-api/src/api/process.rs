//! Analysis processing and its status transitions
//!
//! UPLOADED/COMPLETED/FAILED → PROCESSING → COMPLETED or FAILED.
//! With the local default AI service URL the analysis is fabricated in
//! process by [`crate::mock`]; otherwise the AI service runs a job and the
//! status endpoint syncs the schematic from it.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use schematic_common::ai::{JobState, JobStatus, ProcessRequest};
use schematic_common::models::SchematicStatus;

use super::schematics::owned_schematic;
use super::AuthUser;
use crate::db::{analysis, schematics};
use crate::error::{ApiError, ApiResult};
use crate::mock;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// Always `"processing"`
    pub status: String,
    pub schematic_id: String,
    /// AI service job; `None` when processing is mocked
    pub job_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStatusResponse {
    pub status: SchematicStatus,
    pub job_id: Option<String>,
    /// Latest job report from the AI service, when one was fetched
    pub job: Option<JobStatus>,
}

/// POST /api/schematics/:id/process
pub async fn start_processing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProcessResponse>> {
    let schematic = owned_schematic(&state, &id, &auth.id).await?;

    if schematic.status == SchematicStatus::Processing
        || !schematics::begin_processing(&state.db, &id).await?
    {
        return Err(ApiError::Conflict("Already processing".to_string()));
    }

    info!(schematic_id = %id, mock = state.settings.use_mock, "Processing started");

    // Re-processing replaces earlier results
    if let Err(e) = analysis::clear_analysis(&state.db, &id).await {
        fail(&state, &id).await;
        return Err(e.into());
    }

    let job_id = if state.settings.use_mock {
        run_mock_analysis(&state, &id).await?;
        None
    } else {
        Some(submit_job(&state, &id, &schematic.file_url).await?)
    };

    Ok(Json(ProcessResponse {
        status: "processing".to_string(),
        schematic_id: id,
        job_id,
    }))
}

async fn run_mock_analysis(state: &AppState, schematic_id: &str) -> ApiResult<()> {
    let generated = {
        let mut rng = StdRng::from_entropy();
        mock::generate(schematic_id, &mut rng)
    };

    if let Err(e) = store_mock_analysis(state, schematic_id, &generated).await {
        fail(state, schematic_id).await;
        return Err(e.into());
    }

    info!(
        schematic_id = %schematic_id,
        components = generated.components.len(),
        bom_items = generated.bom_items.len(),
        "Mock analysis completed"
    );
    Ok(())
}

async fn store_mock_analysis(
    state: &AppState,
    schematic_id: &str,
    generated: &mock::Analysis,
) -> schematic_common::Result<()> {
    analysis::store_analysis(&state.db, schematic_id, generated).await?;
    schematics::set_ai_job(&state.db, schematic_id, None).await?;
    schematics::mark_completed(&state.db, schematic_id, generated.page_count()).await
}

async fn submit_job(state: &AppState, schematic_id: &str, file_url: &str) -> ApiResult<String> {
    let request = ProcessRequest {
        schematic_id: schematic_id.to_string(),
        file_url: file_url.to_string(),
        callback_url: None,
    };

    match state.ai.trigger_processing(&request).await {
        Ok(job) => {
            schematics::set_ai_job(&state.db, schematic_id, Some(&job.job_id)).await?;
            info!(schematic_id = %schematic_id, job_id = %job.job_id, "AI job queued");
            Ok(job.job_id)
        }
        Err(e) => {
            fail(state, schematic_id).await;
            Err(ApiError::AiService(e))
        }
    }
}

/// Mark FAILED; a failure here is logged, the original error is what the client sees
async fn fail(state: &AppState, schematic_id: &str) {
    if let Err(e) = schematics::set_status(&state.db, schematic_id, SchematicStatus::Failed).await {
        warn!(schematic_id = %schematic_id, error = %e, "Could not mark schematic FAILED");
    }
}

/// GET /api/schematics/:id/status
pub async fn processing_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProcessStatusResponse>> {
    let mut schematic = owned_schematic(&state, &id, &auth.id).await?;
    let mut job = None;

    let pollable = !state.settings.use_mock && schematic.status == SchematicStatus::Processing;
    if let (true, Some(job_id)) = (pollable, schematic.ai_job_id.as_deref()) {
        match state.ai.job_status(job_id).await {
            Ok(report) => {
                if let Some(status) = apply_job_report(&state, &id, &report).await? {
                    schematic.status = status;
                }
                job = Some(report);
            }
            Err(e) if e.is_not_found() => {
                // The job is gone for good, so the schematic can never complete
                warn!(schematic_id = %id, job_id = %job_id, "AI service lost the job");
                schematics::set_status(&state.db, &id, SchematicStatus::Failed).await?;
                schematic.status = SchematicStatus::Failed;
            }
            Err(e) => {
                // The schematic's own status is still meaningful
                warn!(schematic_id = %id, job_id = %job_id, error = %e, "Job status poll failed");
            }
        }
    }

    Ok(Json(ProcessStatusResponse {
        status: schematic.status,
        job_id: schematic.ai_job_id,
        job,
    }))
}

/// Move the schematic to a terminal status once its job is terminal
async fn apply_job_report(
    state: &AppState,
    schematic_id: &str,
    report: &JobStatus,
) -> ApiResult<Option<SchematicStatus>> {
    match report.status {
        JobState::Completed => {
            let pages = report.result.map(|r| r.pages_processed as i64).unwrap_or(0);
            schematics::mark_completed(&state.db, schematic_id, pages).await?;
            info!(schematic_id = %schematic_id, job_id = %report.job_id, "AI job completed");
            Ok(Some(SchematicStatus::Completed))
        }
        JobState::Failed => {
            schematics::set_status(&state.db, schematic_id, SchematicStatus::Failed).await?;
            warn!(
                schematic_id = %schematic_id,
                job_id = %report.job_id,
                message = report.message.as_deref().unwrap_or(""),
                "AI job failed"
            );
            Ok(Some(SchematicStatus::Failed))
        }
        JobState::Queued | JobState::Processing => Ok(None),
    }
}

pub fn process_routes() -> Router<AppState> {
    Router::new()
        .route("/api/schematics/:id/process", post(start_processing))
        .route("/api/schematics/:id/status", get(processing_status))
}
