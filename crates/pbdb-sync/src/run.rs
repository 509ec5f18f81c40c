//! The sync use case: reconcile, persist, and record the run.

use pbdb_core::Activity;
use pbdb_db::SyncRunCounts;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::SyncError;
use crate::reconciler::{reconcile, SyncStats};
use crate::source::ActivitySource;

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Upper bound on container result fetches in flight.
    pub max_concurrent_containers: usize,
    /// Recorded on the `sync_runs` row (`cli`, `server`, `scheduler`).
    pub trigger_source: &'static str,
    /// Reconcile and parse but write nothing, not even a ledger row.
    pub dry_run: bool,
}

/// Result of one sync invocation.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Internal `sync_runs.id`; `None` for dry runs.
    pub run_id: Option<i64>,
    /// `sync_runs.public_id`, the identifier exposed to API clients.
    pub run_public_id: Option<Uuid>,
    /// Newly parsed activities, attributed to their agent and container.
    pub activities: Vec<Activity>,
    /// Rows actually written; lower than `activities.len()` only when a
    /// concurrent sync stored some of the same records first.
    pub inserted: u64,
    pub stats: SyncStats,
}

/// Runs one full sync against `pool`.
///
/// The reconciled batch is written in a single transaction, so either all
/// of a pass's activities become visible or none do. Each non-dry run gets
/// a `sync_runs` row that ends `succeeded` or `failed`.
///
/// # Errors
///
/// Returns the reconciler's fatal errors unchanged, [`SyncError::Persist`]
/// if the batch write fails, or [`SyncError::Ledger`] if the run row cannot
/// be created or advanced.
pub async fn run_sync<S>(
    pool: &PgPool,
    source: &S,
    options: SyncOptions,
) -> Result<SyncReport, SyncError>
where
    S: ActivitySource + ?Sized,
{
    if options.dry_run {
        let outcome = reconcile(source, pool, options.max_concurrent_containers).await?;
        tracing::info!(
            new_containers = outcome.stats.containers_new,
            records = outcome.activities.len(),
            "dry run: nothing persisted"
        );
        return Ok(SyncReport {
            run_id: None,
            run_public_id: None,
            activities: outcome.activities,
            inserted: 0,
            stats: outcome.stats,
        });
    }

    let run = pbdb_db::create_sync_run(pool, options.trigger_source)
        .await
        .map_err(SyncError::Ledger)?;
    if let Err(e) = pbdb_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(SyncError::Ledger(e));
    }

    let outcome = match reconcile(source, pool, options.max_concurrent_containers).await {
        Ok(outcome) => outcome,
        Err(e) => {
            fail_run_best_effort(pool, run.id, error_chain(&e)).await;
            return Err(e);
        }
    };

    let inserted = match pbdb_db::insert_activities(pool, &outcome.activities).await {
        Ok(inserted) => inserted,
        Err(e) => {
            let err = SyncError::Persist(e);
            fail_run_best_effort(pool, run.id, error_chain(&err)).await;
            return Err(err);
        }
    };

    let counts = ledger_counts(&outcome.stats, inserted);
    if let Err(e) = pbdb_db::complete_sync_run(pool, run.id, &counts).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(SyncError::Ledger(e));
    }

    tracing::info!(
        run_id = run.id,
        fetched = outcome.stats.containers_fetched,
        failed = outcome.stats.containers_failed,
        records = outcome.activities.len(),
        inserted,
        "sync complete"
    );

    Ok(SyncReport {
        run_id: Some(run.id),
        run_public_id: Some(run.public_id),
        activities: outcome.activities,
        inserted,
        stats: outcome.stats,
    })
}

fn ledger_counts(stats: &SyncStats, inserted: u64) -> SyncRunCounts {
    let clamp = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
    SyncRunCounts {
        containers_discovered: clamp(stats.containers_discovered),
        containers_new: clamp(stats.containers_new),
        containers_fetched: clamp(stats.containers_fetched),
        containers_failed: clamp(stats.containers_failed),
        records_parsed: clamp(stats.records_parsed),
        records_invalid: clamp(stats.records_invalid),
        records_inserted: i32::try_from(inserted).unwrap_or(i32::MAX),
    }
}

/// Renders an error and its sources as `outer: inner: ...`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

async fn fail_run_best_effort(pool: &PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = pbdb_db::fail_sync_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark sync run as failed"
        );
    }
}
