use std::collections::BTreeMap;

use crate::types::{JsonMap, JsonValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    None,
    #[serde(alias = "bearer")]
    BearerToken,
    ApiKey,
    #[serde(alias = "basic")]
    BasicAuth,
    Oauth2,
    Custom,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::None => "none",
            AuthType::BearerToken => "bearer_token",
            AuthType::ApiKey => "api_key",
            AuthType::BasicAuth => "basic_auth",
            AuthType::Oauth2 => "oauth2",
            AuthType::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct RequestSchema {
    /// Body defaults; mapped and dependency values are merged on top.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<JsonMap>,
}

/// One HTTP call definition inside a sequence, or a standalone deployed unit.
///
/// Steps refer to their parent by `sequence_id` only; the parent never owns live step objects.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step {
    #[serde(default)]
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<i64>,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_sequence_order")]
    pub sequence_order: i32,

    #[serde(default = "default_http_method")]
    pub http_method: String,

    /// Absolute URL, or a path relative to the lender base URL.
    pub api_endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_config: Option<JsonMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<RequestSchema>,

    /// `target_path -> source_output_key`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub depends_on_fields: BTreeMap<String, String>,

    /// Paths into the response body to extract for later steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_fields: Vec<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: u64,
}

impl Step {
    pub fn method(&self) -> String {
        let m = self.http_method.trim();
        if m.is_empty() {
            "POST".to_string()
        } else {
            m.to_ascii_uppercase()
        }
    }

    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Step {}", self.sequence_order)
        } else {
            self.name.clone()
        }
    }
}

fn default_sequence_order() -> i32 {
    1
}

fn default_http_method() -> String {
    "POST".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay_seconds() -> u64 {
    5
}
