//! Wire types of the AI processing service
//!
//! The service speaks snake_case JSON; these types are shared by the service
//! and the web API's client so both sides agree on the shape.

use serde::{Deserialize, Serialize};

/// POST /process request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub schematic_id: String,
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// Lifecycle of a processing job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Counts reported by a finished job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub pages_processed: u32,
    pub components_detected: u32,
    pub text_blocks_extracted: u32,
    pub connections_found: u32,
}

/// Job status as returned by POST /process and GET /status/{job_id}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub status: JobState,
    /// 0.0 to 1.0
    pub progress: f64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<JobResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_wire_shape() {
        let status = JobStatus {
            job_id: "j1".into(),
            status: JobState::Queued,
            progress: 0.0,
            message: Some("Job queued for processing".into()),
            result: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "QUEUED");
        assert_eq!(json["job_id"], "j1");
        assert!(json["result"].is_null());
    }

    #[test]
    fn test_callback_url_omitted_when_absent() {
        let req = ProcessRequest {
            schematic_id: "s".into(),
            file_url: "schematics/u/s/a.pdf".into(),
            callback_url: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("callback_url").is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Processing.is_terminal());
    }
}
