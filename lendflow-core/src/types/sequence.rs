use std::collections::BTreeMap;

use crate::types::{JsonValue, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
    Conditional,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel => "parallel",
            ExecutionMode::Conditional => "conditional",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sequential" => Some(ExecutionMode::Sequential),
            "parallel" => Some(ExecutionMode::Parallel),
            "conditional" => Some(ExecutionMode::Conditional),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Equals,
    NotEquals,
    Exists,
    GreaterThan,
    LessThan,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub predicate: Predicate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
}

/// `step id (as string) -> field -> condition`
pub type ConditionConfig = BTreeMap<String, BTreeMap<String, Condition>>;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IntegrationSequence {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub lender_id: i64,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_sequence_type")]
    pub sequence_type: String,

    #[serde(default)]
    pub execution_mode: ExecutionMode,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub condition_config: ConditionConfig,

    #[serde(default = "default_true")]
    pub stop_on_error: bool,

    #[serde(default)]
    pub retry_failed_steps: bool,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A sequence together with its steps, as loaded from a document or a deployment record.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SequenceDocument {
    #[serde(flatten)]
    pub sequence: IntegrationSequence,

    #[serde(default)]
    pub steps: Vec<Step>,
}

impl SequenceDocument {
    /// Steps sorted by `sequence_order`; ties keep document order.
    pub fn ordered_steps(&self) -> Vec<Step> {
        let mut steps = self.steps.clone();
        steps.sort_by_key(|s| s.sequence_order);
        steps
    }
}

fn default_sequence_type() -> String {
    "lead_submission".to_string()
}

fn default_true() -> bool {
    true
}
