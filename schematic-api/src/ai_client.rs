//! HTTP client for the AI processing service

use schematic_common::ai::{JobStatus, ProcessRequest};
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const HEALTH_TIMEOUT_SECS: u64 = 2;

/// AI service client errors
#[derive(Debug, Error)]
pub enum AiClientError {
    /// Connection refused, timeout, DNS failure
    #[error("Network error: {0}")]
    Network(String),

    /// Service answered with a non-success status
    #[error("{status} {reason}")]
    Status { status: u16, reason: String },

    /// Response body was not a job status
    #[error("Parse error: {0}")]
    Parse(String),
}

impl AiClientError {
    /// The service does not know the job (it keeps jobs in memory only)
    pub fn is_not_found(&self) -> bool {
        matches!(self, AiClientError::Status { status: 404, .. })
    }
}

/// Client for the AI service's job API
#[derive(Clone)]
pub struct AiClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl AiClient {
    pub fn new(base_url: &str) -> Result<Self, AiClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AiClientError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queue a schematic for processing
    pub async fn trigger_processing(
        &self,
        request: &ProcessRequest,
    ) -> Result<JobStatus, AiClientError> {
        let url = format!("{}/process", self.base_url);
        tracing::debug!(schematic_id = %request.schematic_id, url = %url, "Triggering AI processing");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AiClientError::Network(e.to_string()))?;

        Self::parse_job(response).await
    }

    /// Current status of a job
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatus, AiClientError> {
        let url = format!("{}/status/{}", self.base_url, job_id);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AiClientError::Network(e.to_string()))?;

        Self::parse_job(response).await
    }

    /// Whether the service answers its health endpoint; never errors
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self
            .http_client
            .get(&url)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "AI service health check failed");
                false
            }
        }
    }

    async fn parse_job(response: reqwest::Response) -> Result<JobStatus, AiClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(AiClientError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        response
            .json::<JobStatus>()
            .await
            .map_err(|e| AiClientError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let client = AiClient::new("http://ai.internal:8000/").unwrap();
        assert_eq!(client.base_url(), "http://ai.internal:8000");
    }

    #[test]
    fn test_status_error_message() {
        let err = AiClientError::Status {
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "503 Service Unavailable");
    }

    #[test]
    fn test_only_404_means_job_lost() {
        let lost = AiClientError::Status {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert!(lost.is_not_found());
        assert!(!AiClientError::Network("refused".to_string()).is_not_found());
        assert!(!AiClientError::Status {
            status: 500,
            reason: "Internal Server Error".to_string(),
        }
        .is_not_found());
    }

    #[tokio::test]
    async fn test_health_false_when_unreachable() {
        // Port 1 is never bound in test environments
        let client = AiClient::new("http://127.0.0.1:1").unwrap();
        assert!(!client.check_health().await);
    }
}
