//! Schematic analysis pipeline
//!
//! A job walks five stages in order. Before each stage the job is moved to
//! PROCESSING with the stage's progress and message, so a poller sees which
//! stage is running. The first stage error fails the job with that error's
//! message. When every stage succeeds the job completes with the counts the
//! stages accumulated.
//!
//! The stage work itself sits behind [`StageRunner`]. [`PlaceholderStages`]
//! performs no analysis and reports zero counts; detection and OCR models
//! plug in there.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use schematic_common::ai::{JobResult, JobState, JobStatus, ProcessRequest};

use crate::AppState;

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// PDF pages to images
    Rasterize,
    DetectComponents,
    ExtractWires,
    RecognizeText,
    /// Associate labels with components and build the netlist
    BuildGraph,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Rasterize,
        Stage::DetectComponents,
        Stage::ExtractWires,
        Stage::RecognizeText,
        Stage::BuildGraph,
    ];

    /// Job progress while this stage runs
    pub fn progress(self) -> f64 {
        match self {
            Stage::Rasterize => 0.1,
            Stage::DetectComponents => 0.3,
            Stage::ExtractWires => 0.5,
            Stage::RecognizeText => 0.7,
            Stage::BuildGraph => 0.9,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Stage::Rasterize => "Rasterizing PDF pages...",
            Stage::DetectComponents => "Detecting components...",
            Stage::ExtractWires => "Extracting wires/connections...",
            Stage::RecognizeText => "Recognizing text...",
            Stage::BuildGraph => "Building connectivity graph...",
        }
    }
}

pub const COMPLETE_MESSAGE: &str = "Processing complete";

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StageError(pub String);

/// Performs the work of one stage, adding to the running counts
#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn run(
        &self,
        stage: Stage,
        request: &ProcessRequest,
        result: &mut JobResult,
    ) -> Result<(), StageError>;
}

/// Stage runner without models: every stage succeeds and finds nothing
pub struct PlaceholderStages;

#[async_trait]
impl StageRunner for PlaceholderStages {
    async fn run(
        &self,
        stage: Stage,
        request: &ProcessRequest,
        _result: &mut JobResult,
    ) -> Result<(), StageError> {
        debug!(
            schematic_id = %request.schematic_id,
            stage = ?stage,
            "No model configured for stage"
        );
        Ok(())
    }
}

/// Run every stage for `job_id`, then notify the callback URL if one was given
///
/// Returns the final job status, or `None` if the job is not registered.
pub async fn run_pipeline(
    state: AppState,
    job_id: String,
    request: ProcessRequest,
) -> Option<JobStatus> {
    info!(job_id = %job_id, schematic_id = %request.schematic_id, "Pipeline started");

    let mut result = JobResult::default();
    let mut failure = None;

    for stage in Stage::ALL {
        state
            .jobs
            .update(&job_id, |job| {
                job.status = JobState::Processing;
                job.progress = stage.progress();
                job.message = Some(stage.message().to_string());
            })
            .await?;

        if let Err(e) = state.runner.run(stage, &request, &mut result).await {
            warn!(job_id = %job_id, stage = ?stage, error = %e, "Pipeline stage failed");
            failure = Some(e);
            break;
        }

        pause(state.settings.stage_delay).await;
    }

    let status = match failure {
        Some(e) => {
            state
                .jobs
                .update(&job_id, |job| {
                    job.status = JobState::Failed;
                    job.message = Some(e.to_string());
                })
                .await?
        }
        None => {
            let status = state
                .jobs
                .update(&job_id, |job| {
                    job.status = JobState::Completed;
                    job.progress = 1.0;
                    job.message = Some(COMPLETE_MESSAGE.to_string());
                    job.result = Some(result);
                })
                .await?;
            info!(job_id = %job_id, "Pipeline complete");
            status
        }
    };

    if let Some(url) = request.callback_url.as_deref() {
        notify_callback(&state.http, url, &status).await;
    }

    Some(status)
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// POST the final status to the caller's callback URL
///
/// Failures are logged; the job status is already final.
async fn notify_callback(http: &reqwest::Client, url: &str, status: &JobStatus) {
    match http.post(url).json(status).send().await {
        Ok(response) if response.status().is_success() => {
            debug!(job_id = %status.job_id, url = %url, "Callback delivered");
        }
        Ok(response) => {
            warn!(
                job_id = %status.job_id,
                url = %url,
                status = %response.status(),
                "Callback rejected"
            );
        }
        Err(e) => {
            warn!(job_id = %status.job_id, url = %url, error = %e, "Callback failed");
        }
    }
}
