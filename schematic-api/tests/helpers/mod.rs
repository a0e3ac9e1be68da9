//! Test helper utilities for schematic-api

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;

use schematic_api::ai_client::AiClient;
use schematic_api::storage::{ObjectStore, StorageError};
use schematic_api::{build_router, ApiSettings, AppState};
use schematic_common::ai::{JobResult, JobState, JobStatus, ProcessRequest};
use schematic_common::db::init_memory_database;

/// Object store that records calls instead of talking to S3
#[derive(Default)]
pub struct MemoryStore {
    pub deleted: Mutex<Vec<String>>,
    pub fail_deletes: bool,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!(
            "https://storage.test/{}?method=PUT&type={}&expires={}",
            key,
            content_type,
            expires.as_secs()
        ))
    }

    fn presign_get(&self, key: &str, expires: Duration) -> Result<String, StorageError> {
        Ok(format!(
            "https://storage.test/{}?method=GET&expires={}",
            key,
            expires.as_secs()
        ))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes {
            return Err(StorageError::Network("storage offline".to_string()));
        }
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// App in mock-processing mode
    pub async fn new() -> Self {
        Self::with(MemoryStore::default(), ApiSettings::default(), "http://localhost:8000").await
    }

    pub async fn with(store: MemoryStore, settings: ApiSettings, ai_url: &str) -> Self {
        let pool = init_memory_database().await.expect("in-memory database");
        let store = Arc::new(store);
        let ai = AiClient::new(ai_url).expect("AI client");
        let state = AppState::new(pool.clone(), store.clone(), ai, settings);

        Self {
            router: build_router(state),
            pool,
            store,
        }
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Register and log in; returns (user id, token)
    pub async fn login_new_user(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(serde_json::json!({
                    "name": "Test User",
                    "email": email,
                    "password": "password123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        let user_id = body["id"].as_str().unwrap().to_string();

        let (status, body) = self
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": "password123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        (user_id, body["token"].as_str().unwrap().to_string())
    }

    /// Create an upload slot and return the schematic id
    pub async fn upload(&self, token: &str, file_name: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/upload",
                Some(token),
                Some(serde_json::json!({
                    "fileName": file_name,
                    "fileSize": 2048,
                    "contentType": "application/pdf",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "upload failed: {}", body);
        body["schematicId"].as_str().unwrap().to_string()
    }
}

/// What the stub AI service reports for any job
#[derive(Clone)]
pub enum StubJob {
    /// `GET /status/:id` answers with this state and result
    Report(JobState, Option<JobResult>),
    /// `GET /status/:id` answers 404, as after an AI service restart
    Lost,
}

#[derive(Clone)]
struct StubState {
    job: StubJob,
    requests: Arc<Mutex<Vec<ProcessRequest>>>,
}

/// AI service stand-in listening on a random local port
pub struct StubAi {
    pub url: String,
    pub requests: Arc<Mutex<Vec<ProcessRequest>>>,
}

pub const STUB_JOB_ID: &str = "j-1";

pub async fn spawn_stub_ai(job: StubJob) -> StubAi {
    async fn process(
        State(stub): State<StubState>,
        Json(request): Json<ProcessRequest>,
    ) -> Json<JobStatus> {
        stub.requests.lock().unwrap().push(request);
        Json(JobStatus {
            job_id: STUB_JOB_ID.to_string(),
            status: JobState::Queued,
            progress: 0.0,
            message: Some("Job queued for processing".to_string()),
            result: None,
        })
    }

    async fn status(State(stub): State<StubState>, Path(job_id): Path<String>) -> Response {
        match stub.job {
            StubJob::Report(state, result) => Json(JobStatus {
                job_id,
                status: state,
                progress: if state == JobState::Completed { 1.0 } else { 0.5 },
                message: Some(format!("{:?}", state)),
                result,
            })
            .into_response(),
            StubJob::Lost => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "Job not found" })),
            )
                .into_response(),
        }
    }

    let requests = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route("/process", post(process))
        .route("/status/:job_id", get(status))
        .with_state(StubState {
            job,
            requests: requests.clone(),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    StubAi {
        url: format!("http://{}", addr),
        requests,
    }
}

/// App in live mode against `ai_url`
pub async fn live_app(ai_url: &str) -> TestApp {
    let settings = ApiSettings {
        use_mock: false,
        ..ApiSettings::default()
    };
    TestApp::with(MemoryStore::default(), settings, ai_url).await
}
