mod activity;
mod report;
mod sync;
mod upstream;

use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use pbdb_phantombuster::PhantomBusterClient;
use tracing_subscriber::EnvFilter;

use crate::activity::ActivityCommands;
use crate::sync::SyncCommands;
use crate::upstream::UpstreamCommands;

#[derive(Debug, Parser)]
#[command(name = "pbdb-cli")]
#[command(about = "PhantomBuster activity sync and analytics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Pull new activities from PhantomBuster
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },
    /// Query stored activities
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Print the analytics report for one profile
    Report {
        /// Profile URL whose activities are analysed
        #[arg(long)]
        profile_url: String,
        /// Earliest post timestamp to include (inclusive)
        #[arg(long, value_parser = parse_timestamp_arg)]
        start_date: Option<NaiveDateTime>,
        /// Latest post timestamp to include (inclusive)
        #[arg(long, value_parser = parse_timestamp_arg)]
        end_date: Option<NaiveDateTime>,
        /// Emit JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
    /// Inspect the upstream PhantomBuster account without storing anything
    Upstream {
        #[command(subcommand)]
        command: UpstreamCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("pbdb-cli: no command given (try --help)");
        return Ok(());
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(pbdb_core::log_level_from_env()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Upstream inspection reads only the API settings, so it runs without
    // any database configuration.
    if let Commands::Upstream { command } = command {
        let upstream_config = pbdb_core::load_upstream_config_from_env()?;
        let client = build_client(&upstream_config)?;
        return upstream::run_upstream(&client, command).await;
    }

    let config = pbdb_core::load_app_config_from_env()?;
    match command {
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    pbdb_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = pbdb_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        Commands::Sync { command } => {
            let pool = connect(&config).await?;
            match command {
                SyncCommands::Run { dry_run } => {
                    let client = build_client(&config.upstream())?;
                    sync::run_sync_command(&pool, &client, &config, dry_run).await?;
                }
                SyncCommands::Runs { limit } => sync::run_list_runs(&pool, limit).await?,
            }
        }
        Commands::Activity { command } => {
            let pool = connect(&config).await?;
            activity::run_activity(&pool, command).await?;
        }
        Commands::Report {
            profile_url,
            start_date,
            end_date,
            json,
        } => {
            let pool = connect(&config).await?;
            let filter = pbdb_core::AnalyticsReportFilter {
                start_date,
                end_date,
            };
            report::run_report(&pool, &profile_url, &filter, json).await?;
        }
        // Handled above.
        Commands::Upstream { .. } => {}
    }

    Ok(())
}

async fn connect(config: &pbdb_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    pbdb_db::connect_pool_from_config(config)
        .await
        .context("failed to connect to database")
}

/// Builds the upstream client from config, requiring an API key.
fn build_client(config: &pbdb_core::UpstreamConfig) -> anyhow::Result<PhantomBusterClient> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("PHANTOMBUSTER_API_KEY is not set"))?;

    let client = PhantomBusterClient::with_base_url(
        api_key,
        config.request_timeout_secs,
        &config.base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build PhantomBuster client: {e}"))?
    .with_retry(config.max_retries, config.retry_backoff_base_ms);

    Ok(client)
}

fn parse_timestamp_arg(raw: &str) -> Result<NaiveDateTime, String> {
    pbdb_core::parse_timestamp(raw)
        .ok_or_else(|| format!("'{raw}' is not a date (YYYY-MM-DD) or timestamp"))
}
