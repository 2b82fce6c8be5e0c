use chrono::{DateTime, Utc};

use crate::types::{FieldMapping, SequenceDocument, Step};

pub const STATUS_ACTIVE: &str = "active";

/// A step published under an opaque id for direct invocation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeployedStep {
    pub id: String,
    pub lender_id: i64,
    pub step_name: String,
    pub step: Step,
    pub status: String,
    #[serde(default)]
    pub execution_count: i64,
    #[serde(default)]
    pub error_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_executed_at: Option<DateTime<Utc>>,
}

impl DeployedStep {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

/// A whole sequence published under an opaque id, with a frozen copy of its mappings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeployedIntegration {
    pub id: String,
    pub lender_id: i64,
    pub sequence: SequenceDocument,
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
    pub status: String,
    #[serde(default)]
    pub execution_count: i64,
    #[serde(default)]
    pub error_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_executed_at: Option<DateTime<Utc>>,
}

impl DeployedIntegration {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}
