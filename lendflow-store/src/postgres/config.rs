use lendflow_core::types::JsonMap;
use lendflow_core::{ExecutionMode, FieldMapping, IntegrationSequence, Lender, Step};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::postgres::codec::{decode, decode_opt, decode_tag, to_u32, to_u64};
use crate::store::StoreError;

#[derive(sqlx::FromRow)]
struct LenderRow {
    id: i64,
    name: String,
    base_url: String,
    auth_config: Option<JsonValue>,
    is_active: bool,
}

#[derive(sqlx::FromRow)]
struct SequenceRow {
    id: i64,
    lender_id: i64,
    name: String,
    description: Option<String>,
    sequence_type: String,
    execution_mode: String,
    condition_config: JsonValue,
    stop_on_error: bool,
    retry_failed_steps: bool,
    is_active: bool,
}

impl TryFrom<SequenceRow> for IntegrationSequence {
    type Error = StoreError;

    fn try_from(r: SequenceRow) -> Result<Self, Self::Error> {
        let execution_mode = ExecutionMode::parse(&r.execution_mode).ok_or_else(|| {
            StoreError::Decode(format!("unknown execution_mode '{}'", r.execution_mode))
        })?;
        Ok(IntegrationSequence {
            id: r.id,
            lender_id: r.lender_id,
            name: r.name,
            description: r.description,
            sequence_type: r.sequence_type,
            execution_mode,
            condition_config: decode(r.condition_config, "condition_config")?,
            stop_on_error: r.stop_on_error,
            retry_failed_steps: r.retry_failed_steps,
            is_active: r.is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StepRow {
    id: i64,
    sequence_id: i64,
    name: String,
    sequence_order: i32,
    http_method: String,
    api_endpoint: String,
    auth_type: Option<String>,
    auth_config: Option<JsonValue>,
    request_headers: Option<JsonValue>,
    request_schema: Option<JsonValue>,
    depends_on_fields: JsonValue,
    output_fields: JsonValue,
    timeout_seconds: i32,
    retry_count: i32,
    retry_delay_seconds: i32,
}

impl TryFrom<StepRow> for Step {
    type Error = StoreError;

    fn try_from(r: StepRow) -> Result<Self, Self::Error> {
        Ok(Step {
            id: r.id,
            sequence_id: Some(r.sequence_id),
            name: r.name,
            sequence_order: r.sequence_order,
            http_method: r.http_method,
            api_endpoint: r.api_endpoint,
            auth_type: r
                .auth_type
                .map(|t| decode_tag(t, "auth_type"))
                .transpose()?,
            auth_config: decode_opt(r.auth_config, "auth_config")?,
            request_headers: decode_opt(r.request_headers, "request_headers")?,
            request_schema: decode_opt(r.request_schema, "request_schema")?,
            depends_on_fields: decode(r.depends_on_fields, "depends_on_fields")?,
            output_fields: decode(r.output_fields, "output_fields")?,
            timeout_seconds: to_u64(r.timeout_seconds, "timeout_seconds")?,
            retry_count: to_u32(r.retry_count, "retry_count")?,
            retry_delay_seconds: to_u64(r.retry_delay_seconds, "retry_delay_seconds")?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MappingRow {
    id: i64,
    name: String,
    source_field: String,
    source_field_path: Option<String>,
    target_field: String,
    target_field_path: Option<String>,
    transformation_type: String,
    transformation_config: JsonValue,
    is_required: bool,
    default_value: Option<JsonValue>,
    fallback_value: Option<JsonValue>,
    is_active: bool,
}

impl TryFrom<MappingRow> for FieldMapping {
    type Error = StoreError;

    fn try_from(r: MappingRow) -> Result<Self, Self::Error> {
        Ok(FieldMapping {
            id: r.id,
            name: r.name,
            source_field: r.source_field,
            source_field_path: r.source_field_path,
            target_field: r.target_field,
            target_field_path: r.target_field_path,
            transformation_type: decode_tag(r.transformation_type, "transformation_type")?,
            transformation_config: decode::<JsonMap>(
                r.transformation_config,
                "transformation_config",
            )?,
            is_required: r.is_required,
            default_value: r.default_value.filter(|v| !v.is_null()),
            fallback_value: r.fallback_value.filter(|v| !v.is_null()),
            is_active: r.is_active,
        })
    }
}

pub async fn get_lender(pool: &PgPool, lender_id: i64) -> Result<Option<Lender>, StoreError> {
    let row = sqlx::query_as::<_, LenderRow>(
        r#"SELECT id, name, base_url, auth_config, is_active FROM lenders WHERE id = $1"#,
    )
    .bind(lender_id)
    .fetch_optional(pool)
    .await?;
    row.map(|r| {
        Ok(Lender {
            id: r.id,
            name: r.name,
            base_url: r.base_url,
            auth_config: decode_opt(r.auth_config, "lender auth_config")?,
            is_active: r.is_active,
        })
    })
    .transpose()
}

pub async fn get_active_sequence(
    pool: &PgPool,
    lender_id: i64,
) -> Result<Option<IntegrationSequence>, StoreError> {
    let row = sqlx::query_as::<_, SequenceRow>(
        r#"
SELECT id, lender_id, name, description, sequence_type, execution_mode, condition_config,
       stop_on_error, retry_failed_steps, is_active
FROM integration_sequences
WHERE lender_id = $1 AND is_active
ORDER BY updated_at DESC, id DESC
LIMIT 1
        "#,
    )
    .bind(lender_id)
    .fetch_optional(pool)
    .await?;
    row.map(IntegrationSequence::try_from).transpose()
}

pub async fn get_steps(pool: &PgPool, sequence_id: i64) -> Result<Vec<Step>, StoreError> {
    let rows = sqlx::query_as::<_, StepRow>(
        r#"
SELECT id, sequence_id, name, sequence_order, http_method, api_endpoint, auth_type, auth_config,
       request_headers, request_schema, depends_on_fields, output_fields, timeout_seconds,
       retry_count, retry_delay_seconds
FROM integration_steps
WHERE sequence_id = $1
ORDER BY sequence_order, id
        "#,
    )
    .bind(sequence_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Step::try_from).collect()
}

pub async fn get_field_mappings(
    pool: &PgPool,
    lender_id: i64,
) -> Result<Vec<FieldMapping>, StoreError> {
    let rows = sqlx::query_as::<_, MappingRow>(
        r#"
SELECT id, name, source_field, source_field_path, target_field, target_field_path,
       transformation_type, transformation_config, is_required, default_value, fallback_value,
       is_active
FROM field_mappings
WHERE lender_id = $1 AND is_active
ORDER BY id
        "#,
    )
    .bind(lender_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(FieldMapping::try_from).collect()
}
