use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentKind {
    Step,
    Integration,
}

impl DeploymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentKind::Step => "step",
            DeploymentKind::Integration => "integration",
        }
    }

    pub(crate) fn table(&self) -> &'static str {
        match self {
            DeploymentKind::Step => "deployed_steps",
            DeploymentKind::Integration => "deployed_integrations",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success,
    Failure { error: String },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Success => None,
            ExecutionOutcome::Failure { error } => Some(error),
        }
    }
}

/// One executed step attempt, as handed to a [`crate::LogSink`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NewIntegrationLog {
    pub lender_id: i64,
    pub step_id: Option<i64>,
    pub sequence_id: Option<i64>,
    pub step_order: i32,
    /// Shared by every step of one run.
    pub request_id: Uuid,
    pub request_url: String,
    pub request_method: String,
    pub request_headers: JsonValue,
    pub request_body: Option<JsonValue>,
    pub response_status: Option<i32>,
    pub response_body: Option<JsonValue>,
    pub response_headers: JsonValue,
    pub duration_ms: i64,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    pub retry_count: i32,
    pub lead_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct IntegrationLog {
    pub id: i64,
    pub lender_id: i64,
    pub step_id: Option<i64>,
    pub sequence_id: Option<i64>,
    pub step_order: i32,
    pub request_id: Uuid,
    pub request_url: String,
    pub request_method: String,
    pub request_headers: JsonValue,
    pub request_body: Option<JsonValue>,
    pub response_status: Option<i32>,
    pub response_body: Option<JsonValue>,
    pub response_headers: JsonValue,
    pub duration_ms: i64,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    pub retry_count: i32,
    pub lead_id: Option<String>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A run is the set of log rows sharing one `request_id`.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct RunSummary {
    pub request_id: Uuid,
    pub log_count: i64,
    pub failed_count: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
