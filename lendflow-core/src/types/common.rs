pub type JsonValue = serde_json::Value;

/// Free-form key/value configuration (auth config, transformation config, templates).
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
