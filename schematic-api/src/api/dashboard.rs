//! Dashboard statistics

use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use schematic_common::models::SchematicStatus;
use schematic_common::Tier;

use super::schematics::ComponentCount;
use super::AuthUser;
use crate::db::{schematics, search, users};
use crate::error::ApiResult;
use crate::AppState;

const RECENT_SCHEMATICS: i64 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSchematic {
    pub id: String,
    pub file_name: String,
    pub status: SchematicStatus,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "_count")]
    pub count: ComponentCount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_schematics: i64,
    pub total_components: i64,
    pub total_pages: i64,
    pub searches: i64,
    pub tier: Tier,
    /// `null` for unlimited plans
    pub schematic_limit: Option<i64>,
    pub recent_schematics: Vec<RecentSchematic>,
}

/// GET /api/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<DashboardStats>> {
    let totals = schematics::totals_for_user(&state.db, &auth.id).await?;
    let searches = search::search_count(&state.db, &auth.id).await?;
    let tier = users::user_tier(&state.db, &auth.id).await?;
    let recent = schematics::recent_for_user(&state.db, &auth.id, RECENT_SCHEMATICS).await?;

    Ok(Json(DashboardStats {
        total_schematics: totals.schematics,
        total_components: totals.components,
        total_pages: totals.pages,
        searches,
        tier,
        schematic_limit: tier.limits().max_schematics,
        recent_schematics: recent
            .into_iter()
            .map(|summary| RecentSchematic {
                id: summary.schematic.id,
                file_name: summary.schematic.file_name,
                status: summary.schematic.status,
                created_at: summary.schematic.created_at,
                count: ComponentCount {
                    components: summary.component_count,
                },
            })
            .collect(),
    }))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/api/dashboard/stats", get(dashboard_stats))
}
