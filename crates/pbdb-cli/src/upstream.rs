//! `upstream` command handlers: read-only inspection of the PhantomBuster
//! account. Nothing here writes to the database.

use clap::Subcommand;
use pbdb_phantombuster::PhantomBusterClient;

/// Sub-commands available under `upstream`.
#[derive(Debug, Subcommand)]
pub enum UpstreamCommands {
    /// List every agent visible to the API key
    Agents,
    /// Show one agent
    Agent {
        #[arg(long)]
        id: String,
    },
    /// List the containers (runs) of one agent
    Containers {
        #[arg(long)]
        agent_id: String,
    },
    /// Show one container
    Container {
        #[arg(long)]
        id: String,
    },
    /// Print the raw result records of one container as JSON
    Result {
        #[arg(long)]
        container_id: String,
    },
}

pub(crate) async fn run_upstream(
    client: &PhantomBusterClient,
    command: UpstreamCommands,
) -> anyhow::Result<()> {
    match command {
        UpstreamCommands::Agents => {
            let agents = client.list_agents().await?;
            println!("{:<20}NAME", "ID");
            for agent in &agents {
                println!(
                    "{:<20}{}",
                    agent.id,
                    agent.name.as_deref().unwrap_or("\u{2014}")
                );
            }
        }
        UpstreamCommands::Agent { id } => {
            let agent = client.fetch_agent(&id).await?;
            println!("id:              {}", agent.id);
            println!("name:            {}", agent.name.as_deref().unwrap_or("\u{2014}"));
            println!("script:          {}", agent.script.as_deref().unwrap_or("\u{2014}"));
            println!(
                "last end status: {}",
                agent.last_end_status.as_deref().unwrap_or("\u{2014}")
            );
        }
        UpstreamCommands::Containers { agent_id } => {
            let containers = client.list_containers(&agent_id).await?;
            println!("{:<24}STATUS", "ID");
            for container in &containers {
                println!(
                    "{:<24}{}",
                    container.id,
                    container.status.as_deref().unwrap_or("\u{2014}")
                );
            }
        }
        UpstreamCommands::Container { id } => {
            let container = client.fetch_container(&id).await?;
            println!("id:        {}", container.id);
            println!(
                "agent id:  {}",
                container.agent_id.as_deref().unwrap_or("\u{2014}")
            );
            println!(
                "status:    {}",
                container.status.as_deref().unwrap_or("\u{2014}")
            );
            if let Some(code) = container.exit_code {
                println!("exit code: {code}");
            }
        }
        UpstreamCommands::Result { container_id } => {
            let records = client.get_result(&container_id).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
