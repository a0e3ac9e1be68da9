//! schematic-ai library - schematic analysis microservice
//!
//! Accepts processing jobs from the web API, runs the analysis pipeline in
//! the background and reports job progress. Jobs live in memory only.

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod jobs;
pub mod pipeline;

pub use crate::error::{AiError, AiResult};

use jobs::JobStore;
use pipeline::StageRunner;

/// Timeout for callback deliveries
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Pause after each pipeline stage
    pub stage_delay: Duration,
    /// Front-end origin allowed by CORS
    pub allowed_origin: HeaderValue,
    /// How long finished jobs stay pollable
    pub job_retention: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            stage_delay: Duration::from_millis(250),
            allowed_origin: HeaderValue::from_static("http://localhost:3000"),
            job_retention: Duration::from_secs(3600),
        }
    }
}

/// Application state shared across handlers and pipeline tasks
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobStore,
    pub runner: Arc<dyn StageRunner>,
    pub settings: ServiceSettings,
    /// Client for callback deliveries
    pub http: reqwest::Client,
}

impl AppState {
    /// Fails only if the callback HTTP client cannot be built
    pub fn new(
        runner: Arc<dyn StageRunner>,
        settings: ServiceSettings,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(CALLBACK_TIMEOUT)
            .build()?;

        Ok(Self {
            jobs: JobStore::new(),
            runner,
            settings,
            http,
        })
    }
}

/// Build application router
///
/// CORS admits the front-end origin with credentials, which rules out
/// wildcard methods and headers.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.settings.allowed_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    Router::new()
        .merge(api::health_routes())
        .merge(api::job_routes())
        .merge(api::inference_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
