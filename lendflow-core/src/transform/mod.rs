//! Field-level value transformations.
//!
//! Every transformation is total: input it cannot handle is passed through
//! (or reduced to a best-effort string) and a warning is logged, so a single bad
//! field never aborts a request build.

mod format;
mod shape;

use serde_json::Value;

use crate::types::{JsonMap, TransformationType};

pub use format::{clean_phone, format_currency, format_date, format_phone};
pub use shape::{array_format, conditional, object_mapping, split_name};

/// Apply `kind` to `value` using `config`. `null` is returned unchanged.
pub fn transform(value: &Value, kind: TransformationType, config: &JsonMap) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    match kind {
        TransformationType::None => value.clone(),
        TransformationType::FormatPhone => format_phone(value, config),
        TransformationType::FormatDate => format_date(value, config),
        TransformationType::FormatCurrency => format_currency(value, config),
        TransformationType::SplitName => split_name(value),
        TransformationType::ObjectMapping => object_mapping(value, config),
        TransformationType::ArrayFormat => array_format(value, config),
        TransformationType::Conditional => conditional(value, config),
        TransformationType::Custom => {
            tracing::warn!("custom transformation is not implemented; passing value through");
            value.clone()
        }
    }
}

/// Plain string rendering used wherever a value must become text (query params, lookups).
pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn config_str<'a>(config: &'a JsonMap, key: &str) -> Option<&'a str> {
    config.get(key).and_then(Value::as_str)
}
