//! Database operations for the `sync_runs` audit ledger.
//!
//! A run moves `queued -> running -> succeeded | failed`. Transitions are
//! guarded in SQL so an out-of-order call is reported rather than silently
//! overwriting a finished run.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::hooks::instrumented;
use crate::DbError;

const SYNC_RUN_COLUMNS: &str = "id, public_id, trigger_source, status, started_at, completed_at, \
     containers_discovered, containers_new, containers_fetched, containers_failed, \
     records_parsed, records_invalid, records_inserted, error_message, created_at";

/// A row from the `sync_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub containers_discovered: i32,
    pub containers_new: i32,
    pub containers_fetched: i32,
    pub containers_failed: i32,
    pub records_parsed: i32,
    pub records_invalid: i32,
    pub records_inserted: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counters recorded when a run succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncRunCounts {
    pub containers_discovered: i32,
    pub containers_new: i32,
    pub containers_fetched: i32,
    pub containers_failed: i32,
    pub records_parsed: i32,
    pub records_invalid: i32,
    pub records_inserted: i32,
}

/// Creates a new sync run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_sync_run(pool: &PgPool, trigger_source: &str) -> Result<SyncRunRow, DbError> {
    instrumented("create_sync_run", async {
        let sql = format!(
            "INSERT INTO sync_runs (public_id, trigger_source, status) \
             VALUES ($1, $2, 'queued') \
             RETURNING {SYNC_RUN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SyncRunRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(trigger_source)
            .fetch_one(pool)
            .await?;
        Ok::<_, DbError>(row)
    })
    .await
}

/// Marks a queued run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidSyncRunTransition`] if the run is not queued, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn start_sync_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    instrumented("start_sync_run", async {
        let result = sqlx::query(
            "UPDATE sync_runs \
             SET status = 'running', started_at = NOW() \
             WHERE id = $1 AND status = 'queued'",
        )
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::InvalidSyncRunTransition {
                id,
                expected_status: "queued",
            });
        }
        Ok(())
    })
    .await
}

/// Marks a running run as `succeeded` and records its counters.
///
/// # Errors
///
/// Returns [`DbError::InvalidSyncRunTransition`] if the run is not running,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_sync_run(
    pool: &PgPool,
    id: i64,
    counts: &SyncRunCounts,
) -> Result<(), DbError> {
    instrumented("complete_sync_run", async {
        let result = sqlx::query(
            "UPDATE sync_runs \
             SET status = 'succeeded', completed_at = NOW(), \
                 containers_discovered = $1, containers_new = $2, \
                 containers_fetched = $3, containers_failed = $4, \
                 records_parsed = $5, records_invalid = $6, records_inserted = $7 \
             WHERE id = $8 AND status = 'running'",
        )
        .bind(counts.containers_discovered)
        .bind(counts.containers_new)
        .bind(counts.containers_fetched)
        .bind(counts.containers_failed)
        .bind(counts.records_parsed)
        .bind(counts.records_invalid)
        .bind(counts.records_inserted)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::InvalidSyncRunTransition {
                id,
                expected_status: "running",
            });
        }
        Ok(())
    })
    .await
}

/// Marks a queued or running run as `failed` and records the error message.
///
/// A queued run can fail when starting it fails; it must not stay queued.
///
/// # Errors
///
/// Returns [`DbError::InvalidSyncRunTransition`] if the run has already
/// finished, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_sync_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    instrumented("fail_sync_run", async {
        let result = sqlx::query(
            "UPDATE sync_runs \
             SET status = 'failed', completed_at = NOW(), error_message = $1 \
             WHERE id = $2 AND status IN ('queued', 'running')",
        )
        .bind(error_message)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::InvalidSyncRunTransition {
                id,
                expected_status: "queued or running",
            });
        }
        Ok(())
    })
    .await
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_sync_run(pool: &PgPool, id: i64) -> Result<SyncRunRow, DbError> {
    instrumented("get_sync_run", async {
        let sql = format!("SELECT {SYNC_RUN_COLUMNS} FROM sync_runs WHERE id = $1");
        sqlx::query_as::<_, SyncRunRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(DbError::NotFound)
    })
    .await
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sync_runs(pool: &PgPool, limit: i64) -> Result<Vec<SyncRunRow>, DbError> {
    instrumented("list_sync_runs", async {
        let sql = format!(
            "SELECT {SYNC_RUN_COLUMNS} \
             FROM sync_runs \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1"
        );
        let rows = sqlx::query_as::<_, SyncRunRow>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok::<_, DbError>(rows)
    })
    .await
}
