//! Background job scheduler.
//!
//! Registers a recurring sync when `PBDB_SYNC_CRON` is set and an upstream
//! client is configured. Otherwise the scheduler runs with no jobs.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    sync_cron: Option<&str>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match (sync_cron, state.source.is_some()) {
        (Some(cron), true) => register_sync_job(&scheduler, state, cron).await?,
        (Some(_), false) => {
            tracing::warn!("PBDB_SYNC_CRON is set but no upstream client is configured; not scheduling sync");
        }
        (None, _) => {}
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_sync_job(
    scheduler: &JobScheduler,
    state: AppState,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();
        Box::pin(async move {
            tracing::info!("scheduler: starting activity sync");
            run_scheduled_sync(&state).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered activity sync job");
    Ok(())
}

async fn run_scheduled_sync(state: &AppState) {
    let Some(source) = state.source.as_deref() else {
        return;
    };
    let options = pbdb_sync::SyncOptions {
        max_concurrent_containers: state.sync_max_concurrent_containers,
        trigger_source: "scheduler",
        dry_run: false,
    };

    match pbdb_sync::run_sync(&state.pool, source, options).await {
        Ok(report) => tracing::info!(
            run_id = report.run_id,
            inserted = report.inserted,
            failed_containers = report.stats.containers_failed,
            "scheduler: activity sync complete"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: activity sync failed"),
    }
}
