//! JSONB column <-> config value conversions.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::store::StoreError;

pub(crate) fn decode<T: DeserializeOwned>(value: JsonValue, what: &str) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Decode(format!("{what}: {e}")))
}

pub(crate) fn decode_opt<T: DeserializeOwned>(
    value: Option<JsonValue>,
    what: &str,
) -> Result<Option<T>, StoreError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => decode(v, what).map(Some),
    }
}

/// Decode a snake_case enum stored as TEXT.
pub(crate) fn decode_tag<T: DeserializeOwned>(tag: String, what: &str) -> Result<T, StoreError> {
    decode(JsonValue::String(tag), what)
}

pub(crate) fn encode<T: Serialize>(value: &T, what: &str) -> Result<JsonValue, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Decode(format!("{what}: {e}")))
}

pub(crate) fn to_u64(v: i32, what: &str) -> Result<u64, StoreError> {
    u64::try_from(v).map_err(|_| StoreError::Decode(format!("{what}: negative value {v}")))
}

pub(crate) fn to_u32(v: i32, what: &str) -> Result<u32, StoreError> {
    u32::try_from(v).map_err(|_| StoreError::Decode(format!("{what}: negative value {v}")))
}

pub(crate) fn to_i32<T: TryInto<i32> + Copy + std::fmt::Display>(
    v: T,
    what: &str,
) -> Result<i32, StoreError> {
    v.try_into()
        .map_err(|_| StoreError::Decode(format!("{what}: {v} out of range")))
}
