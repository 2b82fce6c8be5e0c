use lendflow_core::{
    DeployedIntegration, DeployedStep, FieldMapping, IntegrationSequence, Lender,
    SequenceDocument, Step,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{
    ConfigStore, DeploymentKind, DeploymentStore, ExecutionOutcome, IntegrationLog, LogSink,
    NewIntegrationLog, RunHistory, RunSummary, StoreError,
};

use super::config;
use super::deployments;
use super::logs;
use super::sequences;

/// All store traits over one connection pool. Every call checks out its own
/// connection, so concurrent step tasks never share a handle.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn save_sequence(
        &self,
        lender_id: i64,
        doc: &SequenceDocument,
    ) -> Result<i64, StoreError> {
        sequences::save_sequence(&self.pool, lender_id, doc).await
    }
}

#[async_trait::async_trait]
impl ConfigStore for PostgresStore {
    async fn get_lender(&self, lender_id: i64) -> Result<Option<Lender>, StoreError> {
        config::get_lender(&self.pool, lender_id).await
    }

    async fn get_active_sequence(&self, lender_id: i64) -> Result<Option<IntegrationSequence>, StoreError> {
        config::get_active_sequence(&self.pool, lender_id).await
    }

    async fn get_steps(&self, sequence_id: i64) -> Result<Vec<Step>, StoreError> {
        config::get_steps(&self.pool, sequence_id).await
    }

    async fn get_field_mappings(&self, lender_id: i64) -> Result<Vec<FieldMapping>, StoreError> {
        config::get_field_mappings(&self.pool, lender_id).await
    }
}

#[async_trait::async_trait]
impl DeploymentStore for PostgresStore {
    async fn get_deployed_step(&self, id: &str) -> Result<Option<DeployedStep>, StoreError> {
        deployments::get_deployed_step(&self.pool, id).await
    }

    async fn get_deployed_integration(&self, id: &str) -> Result<Option<DeployedIntegration>, StoreError> {
        deployments::get_deployed_integration(&self.pool, id).await
    }

    async fn increment_execution_metrics(
        &self,
        kind: DeploymentKind,
        id: &str,
        outcome: &ExecutionOutcome,
    ) -> Result<(), StoreError> {
        deployments::increment_execution_metrics(&self.pool, kind, id, outcome).await
    }
}

#[async_trait::async_trait]
impl LogSink for PostgresStore {
    async fn append_integration_log(&self, log: NewIntegrationLog) -> Result<(), StoreError> {
        logs::append_integration_log(&self.pool, log).await
    }
}

#[async_trait::async_trait]
impl RunHistory for PostgresStore {
    async fn list_runs(&self, lender_id: i64, limit: i64) -> Result<Vec<RunSummary>, StoreError> {
        logs::list_runs(&self.pool, lender_id, limit).await
    }

    async fn get_run_logs(&self, lender_id: i64, request_id: Uuid) -> Result<Vec<IntegrationLog>, StoreError> {
        logs::get_run_logs(&self.pool, lender_id, request_id).await
    }
}
