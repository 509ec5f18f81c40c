//! `activity` command handlers: read-only queries over stored activities.

use clap::{Args, Subcommand};
use pbdb_core::{normalize_list_limit, normalize_offset, Activity, ActivityFilter};

/// Sub-commands available under `activity`.
#[derive(Debug, Subcommand)]
pub enum ActivityCommands {
    /// List stored activities matching every given filter
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Page size (1-1000)
        #[arg(long)]
        limit: Option<i64>,
        /// Rows to skip
        #[arg(long)]
        offset: Option<i64>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List every profile with at least one stored activity
    Profiles,
}

/// Equality filters; each unset flag imposes no constraint.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub profile_url: Option<String>,
    #[arg(long)]
    pub post_url: Option<String>,
    #[arg(long = "type")]
    pub activity_type: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub agent_id: Option<String>,
    #[arg(long)]
    pub container_id: Option<String>,
}

impl From<FilterArgs> for ActivityFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            profile_url: args.profile_url,
            post_url: args.post_url,
            activity_type: args.activity_type,
            action: args.action,
            agent_id: args.agent_id,
            container_id: args.container_id,
            ..Self::default()
        }
    }
}

pub(crate) async fn run_activity(
    pool: &sqlx::PgPool,
    command: ActivityCommands,
) -> anyhow::Result<()> {
    match command {
        ActivityCommands::List {
            filter,
            limit,
            offset,
            json,
        } => {
            let filter = ActivityFilter::from(filter);
            let activities = pbdb_db::list_activities(
                pool,
                &filter,
                normalize_list_limit(limit),
                normalize_offset(offset),
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&activities)?);
            } else {
                print_table(&activities);
            }
        }
        ActivityCommands::Profiles => {
            let profiles = pbdb_db::list_distinct_profiles(pool).await?;
            if profiles.is_empty() {
                println!("no profiles stored");
            }
            for profile in profiles {
                println!("{profile}");
            }
        }
    }
    Ok(())
}

fn print_table(activities: &[Activity]) {
    if activities.is_empty() {
        println!("no activities found");
        return;
    }
    println!(
        "{:<21}{:<12}{:>7}{:>10}  POST",
        "POSTED", "TYPE", "LIKES", "COMMENTS"
    );
    for a in activities {
        println!(
            "{:<21}{:<12}{:>7}{:>10}  {}",
            a.post_timestamp.format("%Y-%m-%d %H:%M:%S"),
            a.activity_type,
            a.like_count,
            a.comment_count,
            a.post_url
        );
    }
}
