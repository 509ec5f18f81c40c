use pbdb_db::DbError;
use pbdb_phantombuster::PhantomBusterError;
use thiserror::Error;

/// Failures that abort a sync. Per-container fetch failures are not here:
/// they are logged and the container is left for the next pass.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to list upstream agents")]
    ListAgents(#[source] PhantomBusterError),

    #[error("failed to list containers for agent {agent_id}")]
    ListContainers {
        agent_id: String,
        #[source]
        source: PhantomBusterError,
    },

    #[error("failed to load processed containers")]
    ProcessedIndex(#[source] DbError),

    #[error("failed to persist synced activities")]
    Persist(#[source] DbError),

    #[error("failed to record sync run")]
    Ledger(#[source] DbError),
}
