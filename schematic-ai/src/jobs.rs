//! In-memory job registry
//!
//! Jobs are lost on restart. The web API treats an unknown job id as a
//! failed job. Finished jobs are kept for a retention period so the web API
//! can still poll their final status, then evicted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use schematic_common::ai::{JobState, JobStatus};

struct JobEntry {
    status: JobStatus,
    /// When the job reached COMPLETED or FAILED
    finished_at: Option<Instant>,
}

#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<String, JobEntry>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new QUEUED job and return its status
    pub async fn enqueue(&self) -> JobStatus {
        let status = JobStatus {
            job_id: Uuid::new_v4().to_string(),
            status: JobState::Queued,
            progress: 0.0,
            message: Some("Job queued for processing".to_string()),
            result: None,
        };
        self.jobs.write().await.insert(
            status.job_id.clone(),
            JobEntry {
                status: status.clone(),
                finished_at: None,
            },
        );
        status
    }

    pub async fn get(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .map(|entry| entry.status.clone())
    }

    /// Apply `update` to a job and return the new status
    ///
    /// `None` when the job is unknown.
    pub async fn update<F>(&self, job_id: &str, update: F) -> Option<JobStatus>
    where
        F: FnOnce(&mut JobStatus),
    {
        let mut jobs = self.jobs.write().await;
        let entry = jobs.get_mut(job_id)?;
        update(&mut entry.status);
        if entry.status.status.is_terminal() && entry.finished_at.is_none() {
            entry.finished_at = Some(Instant::now());
        }
        Some(entry.status.clone())
    }

    /// Drop finished jobs older than `retention`; returns how many were dropped
    pub async fn evict_finished(&self, retention: Duration) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, entry| match entry.finished_at {
            Some(finished) => finished.elapsed() < retention,
            None => true,
        });
        before - jobs.len()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

/// Periodically evict finished jobs older than `retention`
pub fn spawn_job_reaper(jobs: JobStore, retention: Duration, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let evicted = jobs.evict_finished(retention).await;
            if evicted > 0 {
                debug!(evicted, "Evicted finished jobs");
            }
        }
    })
}
