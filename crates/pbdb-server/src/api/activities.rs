use axum::{
    extract::{Query, State},
    Extension, Json,
};
use pbdb_core::{normalize_list_limit, normalize_offset, Activity, ActivityFilter};
use pbdb_sync::{run_sync, SyncError, SyncOptions};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `ActivityFilter` and `PageQuery` are read from the same query string;
/// each ignores the other's keys.
pub(super) async fn list_activities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<ActivityFilter>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Activity>>>, ApiError> {
    let activities = pbdb_db::list_activities(
        &state.pool,
        &filter,
        normalize_list_limit(page.limit),
        normalize_offset(page.offset),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(activities, req_id.0)))
}

#[derive(Debug, Serialize)]
pub(super) struct SyncResult {
    /// Same identifier as `sync_run_id` in `GET /api/v1/sync-runs`.
    sync_run_id: Option<Uuid>,
    containers_discovered: usize,
    containers_new: usize,
    containers_fetched: usize,
    containers_failed: usize,
    records_invalid: usize,
    inserted: u64,
    activities: Vec<Activity>,
}

pub(super) async fn sync_activities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SyncResult>>, ApiError> {
    let Some(source) = state.source.as_deref() else {
        return Err(ApiError::new(
            req_id.0,
            "service_unavailable",
            "PHANTOMBUSTER_API_KEY is not configured",
        ));
    };

    let options = SyncOptions {
        max_concurrent_containers: state.sync_max_concurrent_containers,
        trigger_source: "server",
        dry_run: false,
    };
    let report = run_sync(&state.pool, source, options)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    let stats = report.stats;
    let data = SyncResult {
        sync_run_id: report.run_public_id,
        containers_discovered: stats.containers_discovered,
        containers_new: stats.containers_new,
        containers_fetched: stats.containers_fetched,
        containers_failed: stats.containers_failed,
        records_invalid: stats.records_invalid,
        inserted: report.inserted,
        activities: report.activities,
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

fn map_sync_error(request_id: String, error: &SyncError) -> ApiError {
    tracing::error!(error = %error, "sync failed");
    match error {
        SyncError::ListAgents(source) => ApiError::new(
            request_id,
            "upstream_error",
            format!("{error}: {source}"),
        ),
        SyncError::ListContainers { source, .. } => ApiError::new(
            request_id,
            "upstream_error",
            format!("{error}: {source}"),
        ),
        SyncError::ProcessedIndex(_) | SyncError::Persist(_) | SyncError::Ledger(_) => {
            ApiError::new(request_id, "internal_error", error.to_string())
        }
    }
}
