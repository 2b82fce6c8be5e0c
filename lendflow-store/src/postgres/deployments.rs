use chrono::{DateTime, Utc};
use lendflow_core::{DeployedIntegration, DeployedStep};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::postgres::codec::decode;
use crate::store::{DeploymentKind, ExecutionOutcome, StoreError};

#[derive(sqlx::FromRow)]
struct DeployedStepRow {
    id: String,
    lender_id: i64,
    step_name: String,
    step: JsonValue,
    status: String,
    execution_count: i64,
    error_count: i64,
    last_error: Option<String>,
    last_executed_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct DeployedIntegrationRow {
    id: String,
    lender_id: i64,
    sequence: JsonValue,
    field_mappings: JsonValue,
    status: String,
    execution_count: i64,
    error_count: i64,
    last_error: Option<String>,
    last_executed_at: Option<DateTime<Utc>>,
}

pub async fn get_deployed_step(pool: &PgPool, id: &str) -> Result<Option<DeployedStep>, StoreError> {
    let row = sqlx::query_as::<_, DeployedStepRow>(
        r#"
SELECT id, lender_id, step_name, step, status, execution_count, error_count, last_error,
       last_executed_at
FROM deployed_steps WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(|r| {
        Ok(DeployedStep {
            step: decode(r.step, "deployed step")?,
            id: r.id,
            lender_id: r.lender_id,
            step_name: r.step_name,
            status: r.status,
            execution_count: r.execution_count,
            error_count: r.error_count,
            last_error: r.last_error,
            last_executed_at: r.last_executed_at,
        })
    })
    .transpose()
}

pub async fn get_deployed_integration(
    pool: &PgPool,
    id: &str,
) -> Result<Option<DeployedIntegration>, StoreError> {
    let row = sqlx::query_as::<_, DeployedIntegrationRow>(
        r#"
SELECT id, lender_id, sequence, field_mappings, status, execution_count, error_count,
       last_error, last_executed_at
FROM deployed_integrations WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(|r| {
        Ok(DeployedIntegration {
            sequence: decode(r.sequence, "deployed sequence")?,
            field_mappings: decode(r.field_mappings, "deployed field_mappings")?,
            id: r.id,
            lender_id: r.lender_id,
            status: r.status,
            execution_count: r.execution_count,
            error_count: r.error_count,
            last_error: r.last_error,
            last_executed_at: r.last_executed_at,
        })
    })
    .transpose()
}

pub async fn increment_execution_metrics(
    pool: &PgPool,
    kind: DeploymentKind,
    id: &str,
    outcome: &ExecutionOutcome,
) -> Result<(), StoreError> {
    // Table name comes from a closed enum, never from input.
    let sql = format!(
        r#"
UPDATE {table}
SET execution_count = execution_count + 1,
    error_count = error_count + CASE WHEN $2 THEN 0 ELSE 1 END,
    last_error = CASE WHEN $2 THEN last_error ELSE $3 END,
    last_executed_at = now()
WHERE id = $1
        "#,
        table = kind.table()
    );
    let res = sqlx::query(&sql)
        .bind(id)
        .bind(outcome.is_success())
        .bind(outcome.error())
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(StoreError::NotFound(format!("deployed {} {id}", kind.as_str())));
    }
    Ok(())
}
