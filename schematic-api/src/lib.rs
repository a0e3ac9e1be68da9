//! schematic-api library - web API for Smart Schematic
//!
//! Accounts, presigned PDF upload, schematic browsing, analysis processing,
//! search and dashboard statistics.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub mod ai_client;
pub mod api;
pub mod db;
pub mod error;
pub mod mock;
pub mod pagination;
pub mod storage;

use ai_client::AiClient;
use storage::ObjectStore;

/// Runtime settings derived from configuration
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Lifetime of presigned upload and download URLs
    pub presign_expiry: Duration,
    /// Fabricate analysis results instead of calling the AI service
    pub use_mock: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            presign_expiry: Duration::from_secs(3600),
            use_mock: true,
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub store: Arc<dyn ObjectStore>,
    pub ai: AiClient,
    pub settings: ApiSettings,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        store: Arc<dyn ObjectStore>,
        ai: AiClient,
        settings: ApiSettings,
    ) -> Self {
        Self {
            db,
            store,
            ai,
            settings,
        }
    }
}

/// Build application router
///
/// `/health`, register and login are public; everything else needs a session.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    let protected = Router::new()
        .merge(api::session_routes())
        .merge(api::upload_routes())
        .merge(api::schematic_routes())
        .merge(api::process_routes())
        .merge(api::search_routes())
        .merge(api::dashboard_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .merge(api::auth_routes())
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
