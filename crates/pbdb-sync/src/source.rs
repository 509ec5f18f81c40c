//! Capability traits the reconciler depends on, with their production
//! implementations.

use std::collections::HashSet;

use async_trait::async_trait;
use pbdb_db::DbError;
use pbdb_phantombuster::{AgentRef, ContainerRef, PhantomBusterClient, PhantomBusterError};
use serde_json::Value;
use sqlx::PgPool;

/// Upstream system that runs collectors and holds their raw output.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<AgentRef>, PhantomBusterError>;

    /// Every container of `agent_id`, each tagged with that agent.
    async fn list_containers(&self, agent_id: &str)
        -> Result<Vec<ContainerRef>, PhantomBusterError>;

    /// Raw records of one container; empty when the run produced nothing.
    async fn get_result(&self, container_id: &str) -> Result<Vec<Value>, PhantomBusterError>;
}

/// Read access to the `(agent_id, container_id)` pairs already stored.
#[async_trait]
pub trait ProcessedIndex: Send + Sync {
    async fn processed_pairs(&self) -> Result<HashSet<(String, String)>, DbError>;
}

#[async_trait]
impl ActivitySource for PhantomBusterClient {
    async fn list_agents(&self) -> Result<Vec<AgentRef>, PhantomBusterError> {
        PhantomBusterClient::list_agents(self).await
    }

    async fn list_containers(
        &self,
        agent_id: &str,
    ) -> Result<Vec<ContainerRef>, PhantomBusterError> {
        PhantomBusterClient::list_containers(self, agent_id).await
    }

    async fn get_result(&self, container_id: &str) -> Result<Vec<Value>, PhantomBusterError> {
        PhantomBusterClient::get_result(self, container_id).await
    }
}

#[async_trait]
impl ProcessedIndex for PgPool {
    async fn processed_pairs(&self) -> Result<HashSet<(String, String)>, DbError> {
        pbdb_db::distinct_processed_pairs(self).await
    }
}
