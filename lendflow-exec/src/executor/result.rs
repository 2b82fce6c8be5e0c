use std::collections::BTreeMap;
use std::time::Duration;

use lendflow_core::types::JsonMap;
use lendflow_core::{ExecutionMode, ValidationWarning};
use lendflow_store::StoreError;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// The request as sent, credentials included.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RequestSnapshot {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
}

/// Outcome of one step after retries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StepResult {
    pub step_id: i64,
    pub name: String,
    pub step_order: i32,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Parsed response body, `{"raw": ...}` for non-JSON payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
    /// An HTTP response was obtained, whatever its status.
    pub success: bool,
    pub extracted_outputs: JsonMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub request: RequestSnapshot,
    pub attempts: u32,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationWarning>,
}

impl StepResult {
    /// Orchestration-level success: a response with status below 400.
    pub fn is_ok(&self) -> bool {
        self.success && self.status_code.is_some_and(|s| s < 400)
    }

    pub fn failure_message(&self) -> Option<String> {
        if self.is_ok() {
            return None;
        }
        Some(match (&self.error, self.status_code) {
            (Some(e), _) => e.clone(),
            (None, Some(status)) => format!("HTTP {status}"),
            (None, None) => "no response".to_string(),
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepReport {
    Executed(StepResult),
    /// A conditional step whose predicates did not hold. No request was sent.
    Skipped {
        step_id: i64,
        name: String,
        step_order: i32,
    },
    /// A parallel step task that died before producing a result.
    Errored {
        step_id: i64,
        name: String,
        step_order: i32,
        error: String,
    },
}

impl StepReport {
    pub fn step_id(&self) -> i64 {
        match self {
            StepReport::Executed(r) => r.step_id,
            StepReport::Skipped { step_id, .. } | StepReport::Errored { step_id, .. } => *step_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        match self {
            StepReport::Executed(r) => !r.is_ok(),
            StepReport::Skipped { .. } => false,
            StepReport::Errored { .. } => true,
        }
    }

    pub fn as_executed(&self) -> Option<&StepResult> {
        match self {
            StepReport::Executed(r) => Some(r),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    NoSequence,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub run_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<i64>,
    pub lender_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_mode: Option<ExecutionMode>,
    pub stop_on_error: bool,
    pub retry_failed_steps: bool,
    /// A failing step ended the run before every step was attempted.
    pub halted: bool,
    pub steps: Vec<StepReport>,
    /// Outputs merged from successful steps, keyed by output path.
    pub outputs: JsonMap,
}

impl RunReport {
    pub fn no_sequence(run_id: Uuid, lender_id: i64) -> Self {
        Self {
            status: RunStatus::NoSequence,
            run_id,
            sequence_id: None,
            lender_id,
            execution_mode: None,
            stop_on_error: false,
            retry_failed_steps: false,
            halted: false,
            steps: Vec::new(),
            outputs: JsonMap::new(),
        }
    }

    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.is_failure()).count()
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Ok && self.failed_steps() == 0
    }

    /// First failure message, for counters and summaries.
    pub fn first_error(&self) -> Option<String> {
        self.steps.iter().find_map(|s| match s {
            StepReport::Executed(r) => r
                .failure_message()
                .map(|m| format!("step {}: {m}", r.name)),
            StepReport::Errored { name, error, .. } => Some(format!("step {name}: {error}")),
            StepReport::Skipped { .. } => None,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("configuration not found: {0}")]
    ConfigNotFound(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("run timed out after {0:?}")]
    RunTimedOut(Duration),
}
