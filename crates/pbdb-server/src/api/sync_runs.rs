use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SyncRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SyncRunItem {
    sync_run_id: Uuid,
    trigger_source: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    containers_discovered: i32,
    containers_new: i32,
    containers_fetched: i32,
    containers_failed: i32,
    records_parsed: i32,
    records_invalid: i32,
    records_inserted: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<pbdb_db::SyncRunRow> for SyncRunItem {
    fn from(row: pbdb_db::SyncRunRow) -> Self {
        Self {
            sync_run_id: row.public_id,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            containers_discovered: row.containers_discovered,
            containers_new: row.containers_new,
            containers_fetched: row.containers_fetched,
            containers_failed: row.containers_failed,
            records_parsed: row.records_parsed,
            records_invalid: row.records_invalid,
            records_inserted: row.records_inserted,
            error_message: row.error_message,
            created_at: row.created_at,
        }
    }
}

fn normalize_runs_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) async fn list_sync_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SyncRunsQuery>,
) -> Result<Json<ApiResponse<Vec<SyncRunItem>>>, ApiError> {
    let rows = pbdb_db::list_sync_runs(&state.pool, normalize_runs_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(SyncRunItem::from).collect();
    Ok(Json(ApiResponse::new(data, req_id.0)))
}
