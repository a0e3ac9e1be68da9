//! Component and text search

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use schematic_common::models::TextBlock;

use super::AuthUser;
use crate::db::search::{self, ComponentHit, TextHit};
use crate::error::ApiResult;
use crate::pagination::{PageWindow, DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, rename = "type")]
    pub component_type: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentResult {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub ref_designator: Option<String>,
    pub value: Option<String>,
    pub confidence: f64,
    pub schematic_id: String,
    pub schematic_name: String,
    pub page_number: i64,
}

impl From<ComponentHit> for ComponentResult {
    fn from(hit: ComponentHit) -> Self {
        Self {
            id: hit.id,
            component_type: hit.component_type,
            ref_designator: hit.ref_designator,
            value: hit.value,
            confidence: hit.confidence,
            schematic_id: hit.schematic_id,
            schematic_name: hit.schematic_name,
            page_number: hit.page_number,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicRef {
    pub id: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    pub page_number: i64,
    pub schematic: SchematicRef,
}

#[derive(Debug, Serialize)]
pub struct TextResult {
    #[serde(flatten)]
    pub block: TextBlock,
    pub page: PageRef,
}

impl From<TextHit> for TextResult {
    fn from(hit: TextHit) -> Self {
        Self {
            block: hit.block,
            page: PageRef {
                page_number: hit.page_number,
                schematic: SchematicRef {
                    id: hit.schematic_id,
                    file_name: hit.schematic_name,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPagination {
    pub page: i64,
    pub limit: i64,
    pub total_components: i64,
    pub total_text: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub components: Vec<ComponentResult>,
    pub text_blocks: Vec<TextResult>,
    pub pagination: SearchPagination,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// GET /api/search?q=&type=&page=&limit=
///
/// Components match on type (exact) and/or `q` (substring of reference,
/// value or type). Text blocks are searched only when `q` is given.
pub async fn search(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    query: Option<Query<SearchQuery>>,
) -> ApiResult<Response> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let text = non_empty(query.q);
    let component_type = non_empty(query.component_type);

    if text.is_none() && component_type.is_none() {
        return Ok(Json(json!({ "results": [], "total": 0 })).into_response());
    }

    let window = PageWindow::new(
        query.page.unwrap_or(DEFAULT_PAGE),
        query.limit.unwrap_or(DEFAULT_LIMIT),
    );

    let (components, total_components) = search::search_components(
        &state.db,
        &auth.id,
        text.as_deref(),
        component_type.as_deref(),
        window,
    )
    .await?;

    let (text_blocks, total_text) = match text.as_deref() {
        Some(q) => search::search_text(&state.db, &auth.id, q).await?,
        None => (Vec::new(), 0),
    };

    search::record_search(
        &state.db,
        &auth.id,
        text.as_deref().unwrap_or(""),
        component_type.as_deref().unwrap_or(""),
    )
    .await?;

    debug!(
        user_id = %auth.id,
        total_components = total_components,
        total_text = total_text,
        "Search completed"
    );

    Ok(Json(SearchResponse {
        components: components.into_iter().map(ComponentResult::from).collect(),
        text_blocks: text_blocks.into_iter().map(TextResult::from).collect(),
        pagination: SearchPagination {
            page: window.page,
            limit: window.limit,
            total_components,
            total_text,
        },
    })
    .into_response())
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/api/search", get(search))
}
