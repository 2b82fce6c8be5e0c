use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{IntegrationLog, NewIntegrationLog, RunSummary, StoreError};

pub async fn append_integration_log(pool: &PgPool, log: NewIntegrationLog) -> Result<(), StoreError> {
    sqlx::query(
        r#"
INSERT INTO integration_logs
  (lender_id, step_id, sequence_id, step_order, request_id, request_url, request_method,
   request_headers, request_body, response_status, response_body, response_headers,
   duration_ms, error_message, error_code, retry_count, lead_id, user_id)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        "#,
    )
    .bind(log.lender_id)
    .bind(log.step_id)
    .bind(log.sequence_id)
    .bind(log.step_order)
    .bind(log.request_id)
    .bind(log.request_url)
    .bind(log.request_method)
    .bind(log.request_headers)
    .bind(log.request_body)
    .bind(log.response_status)
    .bind(log.response_body)
    .bind(log.response_headers)
    .bind(log.duration_ms)
    .bind(log.error_message)
    .bind(log.error_code)
    .bind(log.retry_count)
    .bind(log.lead_id)
    .bind(log.user_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_runs(pool: &PgPool, lender_id: i64, limit: i64) -> Result<Vec<RunSummary>, StoreError> {
    let rows = sqlx::query_as::<_, RunSummary>(
        r#"
SELECT request_id,
       COUNT(*) AS log_count,
       COUNT(*) FILTER (
         WHERE error_message IS NOT NULL OR response_status IS NULL OR response_status >= 400
       ) AS failed_count,
       MIN(created_at) AS started_at,
       MAX(created_at) AS finished_at
FROM integration_logs
WHERE lender_id = $1
GROUP BY request_id
ORDER BY MAX(created_at) DESC
LIMIT $2
        "#,
    )
    .bind(lender_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_run_logs(
    pool: &PgPool,
    lender_id: i64,
    request_id: Uuid,
) -> Result<Vec<IntegrationLog>, StoreError> {
    let rows = sqlx::query_as::<_, IntegrationLog>(
        r#"
SELECT id, lender_id, step_id, sequence_id, step_order, request_id, request_url,
       request_method, request_headers, request_body, response_status, response_body,
       response_headers, duration_ms, error_message, error_code, retry_count, lead_id,
       user_id, created_at
FROM integration_logs
WHERE lender_id = $1 AND request_id = $2
ORDER BY step_order, id
        "#,
    )
    .bind(lender_id)
    .bind(request_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
