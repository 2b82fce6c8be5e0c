use crate::types::JsonMap;

/// An external loan-origination partner. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Lender {
    #[serde(default)]
    pub id: i64,

    pub name: String,

    /// Joined with relative step endpoints.
    pub base_url: String,

    /// Default auth material used by steps that carry no `auth_config` of their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_config: Option<JsonMap>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
