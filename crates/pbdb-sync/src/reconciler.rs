//! Computes which upstream containers are new and turns their raw output
//! into attributed [`Activity`] records.
//!
//! Ingestion is at most once per container: a container is skipped when any
//! stored activity already names it. A container whose fetch fails, or that
//! yields no valid records, leaves nothing in storage and is therefore
//! picked up again on the next pass.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use pbdb_core::{parse_activity, Activity};
use pbdb_phantombuster::ContainerRef;

use crate::error::SyncError;
use crate::source::{ActivitySource, ProcessedIndex};

/// Counters describing one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub agents: usize,
    pub containers_discovered: usize,
    pub containers_new: usize,
    pub containers_fetched: usize,
    pub containers_failed: usize,
    pub records_parsed: usize,
    pub records_invalid: usize,
}

/// New activities plus the counters that produced them.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub activities: Vec<Activity>,
    pub stats: SyncStats,
}

/// Discovers every container upstream, drops those already ingested, and
/// fetches and parses the rest with at most `max_concurrent` fetches in
/// flight.
///
/// The processed-container snapshot is read once, after discovery and before
/// the first result fetch.
///
/// # Errors
///
/// - [`SyncError::ListAgents`] if the agent listing fails. No containers are
///   listed or fetched.
/// - [`SyncError::ListContainers`] if any agent's container listing fails.
///   No results are fetched.
/// - [`SyncError::ProcessedIndex`] if the snapshot cannot be read.
pub async fn reconcile<S, P>(
    source: &S,
    index: &P,
    max_concurrent: usize,
) -> Result<SyncOutcome, SyncError>
where
    S: ActivitySource + ?Sized,
    P: ProcessedIndex + ?Sized,
{
    let mut stats = SyncStats::default();

    let agents = source.list_agents().await.map_err(|e| {
        tracing::error!(error = %e, "agent listing failed; aborting sync");
        SyncError::ListAgents(e)
    })?;
    stats.agents = agents.len();

    let discovered = discover_containers(source, &agents).await?;
    stats.containers_discovered = discovered.len();

    let processed: HashSet<String> = index
        .processed_pairs()
        .await
        .map_err(SyncError::ProcessedIndex)?
        .into_iter()
        .map(|(_agent_id, container_id)| container_id)
        .collect();

    let new_containers: Vec<ContainerRef> = discovered
        .into_iter()
        .filter(|c| !processed.contains(&c.id))
        .collect();
    stats.containers_new = new_containers.len();

    tracing::info!(
        agents = stats.agents,
        discovered = stats.containers_discovered,
        new = stats.containers_new,
        "reconciled upstream containers against stored activities"
    );

    let fetches: Vec<_> = new_containers
        .iter()
        .map(|container| fetch_result(source, container))
        .collect();
    let fetched: Vec<_> = stream::iter(fetches)
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    let mut activities = Vec::new();
    for (container, result) in fetched {
        let records = match result {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    agent_id = %container.agent_id,
                    container_id = %container.id,
                    error = %e,
                    "container result fetch failed; will retry on next sync"
                );
                stats.containers_failed += 1;
                continue;
            }
        };
        stats.containers_fetched += 1;

        if records.is_empty() {
            tracing::debug!(
                agent_id = %container.agent_id,
                container_id = %container.id,
                "container produced no records"
            );
        }

        for (position, record) in records.into_iter().enumerate() {
            match parse_activity(record, &container.agent_id, &container.id) {
                Ok(activity) => {
                    stats.records_parsed += 1;
                    activities.push(activity);
                }
                Err(e) => {
                    stats.records_invalid += 1;
                    tracing::warn!(
                        agent_id = %container.agent_id,
                        container_id = %container.id,
                        position,
                        error = %e,
                        "skipping invalid activity record"
                    );
                }
            }
        }
    }

    Ok(SyncOutcome { activities, stats })
}

/// Fetches one container's raw records, paired with the container.
async fn fetch_result<'a, S>(
    source: &S,
    container: &'a ContainerRef,
) -> (
    &'a ContainerRef,
    Result<Vec<serde_json::Value>, pbdb_phantombuster::PhantomBusterError>,
)
where
    S: ActivitySource + ?Sized,
{
    (container, source.get_result(&container.id).await)
}

/// Lists containers agent by agent, keeping the first sighting of each id.
async fn discover_containers<S>(
    source: &S,
    agents: &[pbdb_phantombuster::AgentRef],
) -> Result<Vec<ContainerRef>, SyncError>
where
    S: ActivitySource + ?Sized,
{
    let mut seen = HashSet::new();
    let mut discovered = Vec::new();

    for agent in agents {
        let containers = source.list_containers(&agent.id).await.map_err(|e| {
            tracing::error!(agent_id = %agent.id, error = %e, "container listing failed; aborting sync");
            SyncError::ListContainers {
                agent_id: agent.id.clone(),
                source: e,
            }
        })?;

        for container in containers {
            if seen.insert(container.id.clone()) {
                discovered.push(container);
            }
        }
    }

    Ok(discovered)
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod tests;
