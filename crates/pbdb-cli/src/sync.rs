//! `sync` command handlers.

use clap::Subcommand;
use pbdb_phantombuster::PhantomBusterClient;
use pbdb_sync::{run_sync, SyncOptions};

/// Sub-commands available under `sync`.
#[derive(Debug, Subcommand)]
pub enum SyncCommands {
    /// Fetch containers not yet ingested and store their activities
    Run {
        /// Reconcile and parse without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show recent sync runs
    Runs {
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

pub(crate) async fn run_sync_command(
    pool: &sqlx::PgPool,
    client: &PhantomBusterClient,
    config: &pbdb_core::AppConfig,
    dry_run: bool,
) -> anyhow::Result<()> {
    let options = SyncOptions {
        max_concurrent_containers: config.sync_max_concurrent_containers,
        trigger_source: "cli",
        dry_run,
    };
    let report = run_sync(pool, client, options).await?;
    let stats = report.stats;

    if dry_run {
        println!(
            "dry-run: {} new container(s), {} activity record(s) would be stored",
            stats.containers_new,
            report.activities.len()
        );
    } else {
        println!(
            "sync complete: {} new container(s), {} fetched, {} failed, {} record(s) stored",
            stats.containers_new, stats.containers_fetched, stats.containers_failed, report.inserted
        );
    }
    if stats.records_invalid > 0 {
        println!("{} invalid record(s) skipped", stats.records_invalid);
    }

    Ok(())
}

pub(crate) async fn run_list_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = pbdb_db::list_sync_runs(pool, limit.max(1)).await?;
    if runs.is_empty() {
        println!("no sync runs recorded");
        return Ok(());
    }

    println!(
        "{:<6}{:<11}{:<10}{:<22}{:>6}{:>8}{:>9}",
        "ID", "STATUS", "TRIGGER", "STARTED", "NEW", "FAILED", "STORED"
    );
    for run in &runs {
        let started = run.started_at.map_or_else(
            || "\u{2014}".to_string(),
            |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        println!(
            "{:<6}{:<11}{:<10}{:<22}{:>6}{:>8}{:>9}",
            run.id,
            run.status,
            run.trigger_source,
            started,
            run.containers_new,
            run.containers_failed,
            run.records_inserted
        );
        if let Some(message) = &run.error_message {
            println!("      error: {message}");
        }
    }

    Ok(())
}
