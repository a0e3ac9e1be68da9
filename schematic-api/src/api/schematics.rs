//! Schematic list, detail and delete

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use schematic_common::models::{
    BomItem, BomSummary, Component, Schematic, SchematicPage, SchematicStatus,
};

use super::AuthUser;
use crate::db::{analysis, schematics};
use crate::db::schematics::SchematicSummary;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{PageQuery, PageWindow, Pagination};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ComponentCount {
    pub components: i64,
}

/// Row of the schematic list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicListItem {
    pub id: String,
    pub file_name: String,
    pub file_size: i64,
    pub page_count: Option<i64>,
    pub status: SchematicStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "_count")]
    pub count: ComponentCount,
}

impl From<SchematicSummary> for SchematicListItem {
    fn from(summary: SchematicSummary) -> Self {
        let s = summary.schematic;
        Self {
            id: s.id,
            file_name: s.file_name,
            file_size: s.file_size,
            page_count: s.page_count,
            status: s.status,
            created_at: s.created_at,
            updated_at: s.updated_at,
            count: ComponentCount {
                components: summary.component_count,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SchematicListResponse {
    pub schematics: Vec<SchematicListItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailCounts {
    pub components: usize,
    pub pages: usize,
    pub bom_items: usize,
}

/// Everything the viewer needs for one schematic
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicDetail {
    #[serde(flatten)]
    pub schematic: Schematic,
    pub pages: Vec<SchematicPage>,
    pub components: Vec<Component>,
    pub bom_items: Vec<BomItem>,
    #[serde(rename = "_count")]
    pub count: DetailCounts,
    pub download_url: Option<String>,
    pub bom_summary: BomSummary,
}

/// GET /api/schematics
pub async fn list_schematics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    query: Option<Query<PageQuery>>,
) -> ApiResult<Json<SchematicListResponse>> {
    let window = PageWindow::from(query.map(|Query(q)| q).unwrap_or_default());

    let total = schematics::count_for_user(&state.db, &auth.id).await?;
    let rows = schematics::list_for_user(&state.db, &auth.id, window).await?;

    Ok(Json(SchematicListResponse {
        schematics: rows.into_iter().map(SchematicListItem::from).collect(),
        pagination: window.meta(total),
    }))
}

pub(crate) async fn owned_schematic(
    state: &AppState,
    schematic_id: &str,
    user_id: &str,
) -> ApiResult<Schematic> {
    schematics::find_owned(&state.db, schematic_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Schematic not found".to_string()))
}

/// GET /api/schematics/:id
pub async fn get_schematic(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<SchematicDetail>> {
    let schematic = owned_schematic(&state, &id, &auth.id).await?;

    let pages = analysis::pages_with_text(&state.db, &id).await?;
    let components = analysis::components(&state.db, &id).await?;
    let bom_items = analysis::bom_items(&state.db, &id).await?;

    let download_url = if schematic.file_url.is_empty() {
        None
    } else {
        Some(
            state
                .store
                .presign_get(&schematic.file_url, state.settings.presign_expiry)?,
        )
    };

    Ok(Json(SchematicDetail {
        count: DetailCounts {
            components: components.len(),
            pages: pages.len(),
            bom_items: bom_items.len(),
        },
        bom_summary: BomSummary::from_items(&bom_items),
        schematic,
        pages,
        components,
        bom_items,
        download_url,
    }))
}

/// DELETE /api/schematics/:id
///
/// Storage cleanup is best effort; the record is removed regardless.
pub async fn delete_schematic(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let schematic = owned_schematic(&state, &id, &auth.id).await?;

    if !schematic.file_url.is_empty() {
        if let Err(e) = state.store.delete(&schematic.file_url).await {
            warn!(schematic_id = %id, key = %schematic.file_url, error = %e, "Storage delete failed");
        }
    }

    schematics::delete_schematic(&state.db, &id).await?;
    info!(schematic_id = %id, "Schematic deleted");

    Ok(Json(json!({ "success": true })))
}

pub fn schematic_routes() -> Router<AppState> {
    Router::new()
        .route("/api/schematics", get(list_schematics))
        .route(
            "/api/schematics/:id",
            get(get_schematic).delete(delete_schematic),
        )
}
