use lendflow_core::{validate_sequence, SequenceDocument, Step};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, Transaction};

use crate::postgres::codec::{encode, to_i32};
use crate::store::StoreError;

/// Validate and persist `doc` as the lender's active sequence. Returns the sequence id.
///
/// The sequence row is matched by id when `doc` carries one, else by name. Other
/// sequences of the lender are deactivated and the steps are fully replaced.
pub async fn save_sequence(
    pool: &PgPool,
    lender_id: i64,
    doc: &SequenceDocument,
) -> Result<i64, StoreError> {
    validate_sequence(doc)?;

    let mut tx = pool.begin().await?;
    let sequence_id = upsert_sequence(&mut tx, lender_id, doc).await?;

    sqlx::query(
        r#"
UPDATE integration_sequences SET is_active = FALSE, updated_at = now()
WHERE lender_id = $1 AND id <> $2 AND is_active
        "#,
    )
    .bind(lender_id)
    .bind(sequence_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(r#"DELETE FROM integration_steps WHERE sequence_id = $1"#)
        .bind(sequence_id)
        .execute(&mut *tx)
        .await?;

    for step in doc.ordered_steps() {
        insert_step(&mut tx, sequence_id, &step).await?;
    }

    tx.commit().await?;
    tracing::info!(lender_id, sequence_id, steps = doc.steps.len(), "sequence saved");
    Ok(sequence_id)
}

async fn upsert_sequence(
    tx: &mut Transaction<'_, Postgres>,
    lender_id: i64,
    doc: &SequenceDocument,
) -> Result<i64, StoreError> {
    let seq = &doc.sequence;
    let condition_config = encode(&seq.condition_config, "condition_config")?;

    if seq.id > 0 {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
UPDATE integration_sequences
SET name = $3, description = $4, sequence_type = $5, execution_mode = $6,
    condition_config = $7, stop_on_error = $8, retry_failed_steps = $9,
    is_active = TRUE, updated_at = now()
WHERE id = $1 AND lender_id = $2
RETURNING id
            "#,
        )
        .bind(seq.id)
        .bind(lender_id)
        .bind(&seq.name)
        .bind(&seq.description)
        .bind(&seq.sequence_type)
        .bind(seq.execution_mode.as_str())
        .bind(&condition_config)
        .bind(seq.stop_on_error)
        .bind(seq.retry_failed_steps)
        .fetch_optional(&mut **tx)
        .await?;
        return id.ok_or_else(|| {
            StoreError::NotFound(format!("sequence {} for lender {lender_id}", seq.id))
        });
    }

    let id: i64 = sqlx::query_scalar(
        r#"
INSERT INTO integration_sequences
  (lender_id, name, description, sequence_type, execution_mode, condition_config,
   stop_on_error, retry_failed_steps, is_active)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
ON CONFLICT (lender_id, name) DO UPDATE
SET description = EXCLUDED.description, sequence_type = EXCLUDED.sequence_type,
    execution_mode = EXCLUDED.execution_mode, condition_config = EXCLUDED.condition_config,
    stop_on_error = EXCLUDED.stop_on_error, retry_failed_steps = EXCLUDED.retry_failed_steps,
    is_active = TRUE, updated_at = now()
RETURNING id
        "#,
    )
    .bind(lender_id)
    .bind(&seq.name)
    .bind(&seq.description)
    .bind(&seq.sequence_type)
    .bind(seq.execution_mode.as_str())
    .bind(&condition_config)
    .bind(seq.stop_on_error)
    .bind(seq.retry_failed_steps)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

async fn insert_step(
    tx: &mut Transaction<'_, Postgres>,
    sequence_id: i64,
    step: &Step,
) -> Result<(), StoreError> {
    let auth_config = step.auth_config.clone().map(JsonValue::Object);
    let request_headers = step
        .request_headers
        .as_ref()
        .map(|h| encode(h, "request_headers"))
        .transpose()?;
    let request_schema = step
        .request_schema
        .as_ref()
        .map(|s| encode(s, "request_schema"))
        .transpose()?;

    sqlx::query(
        r#"
INSERT INTO integration_steps
  (sequence_id, name, sequence_order, http_method, api_endpoint, auth_type, auth_config,
   request_headers, request_schema, depends_on_fields, output_fields, timeout_seconds,
   retry_count, retry_delay_seconds)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(sequence_id)
    .bind(&step.name)
    .bind(step.sequence_order)
    .bind(step.method())
    .bind(&step.api_endpoint)
    .bind(step.auth_type.map(|t| t.as_str()))
    .bind(auth_config)
    .bind(request_headers)
    .bind(request_schema)
    .bind(encode(&step.depends_on_fields, "depends_on_fields")?)
    .bind(encode(&step.output_fields, "output_fields")?)
    .bind(to_i32(step.timeout_seconds, "timeout_seconds")?)
    .bind(to_i32(step.retry_count, "retry_count")?)
    .bind(to_i32(step.retry_delay_seconds, "retry_delay_seconds")?)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
