use async_trait::async_trait;
use lendflow_core::{
    DeployedIntegration, DeployedStep, FieldMapping, IntegrationSequence, Lender, Step,
    ValidationError,
};
use uuid::Uuid;

use crate::store::types::*;

/// Read-only access to lender integration configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Base URL and default auth material for a lender.
    async fn get_lender(&self, lender_id: i64) -> Result<Option<Lender>, StoreError>;

    async fn get_active_sequence(
        &self,
        lender_id: i64,
    ) -> Result<Option<IntegrationSequence>, StoreError>;

    /// Steps of a sequence ordered by `sequence_order`.
    async fn get_steps(&self, sequence_id: i64) -> Result<Vec<Step>, StoreError>;

    /// Active field mappings of a lender.
    async fn get_field_mappings(&self, lender_id: i64) -> Result<Vec<FieldMapping>, StoreError>;
}

#[async_trait]
pub trait DeploymentStore: Send + Sync {
    async fn get_deployed_step(&self, id: &str) -> Result<Option<DeployedStep>, StoreError>;

    async fn get_deployed_integration(
        &self,
        id: &str,
    ) -> Result<Option<DeployedIntegration>, StoreError>;

    /// Atomic counter increment. A failure also bumps `error_count` and records `last_error`.
    async fn increment_execution_metrics(
        &self,
        kind: DeploymentKind,
        id: &str,
        outcome: &ExecutionOutcome,
    ) -> Result<(), StoreError>;
}

/// Append-only sink for integration log rows.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn append_integration_log(&self, log: NewIntegrationLog) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RunHistory: Send + Sync {
    /// Most recent runs first.
    async fn list_runs(&self, lender_id: i64, limit: i64) -> Result<Vec<RunSummary>, StoreError>;

    /// Log rows of one run ordered by `step_order`.
    async fn get_run_logs(
        &self,
        lender_id: i64,
        request_id: Uuid,
    ) -> Result<Vec<IntegrationLog>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("failed to decode stored record: {0}")]
    Decode(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Decode(e.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}
