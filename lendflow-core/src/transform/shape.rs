use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::transform::format::clean_phone;
use crate::transform::{config_str, value_to_string};
use crate::types::JsonMap;

/// `"John Michael Smith"` -> `{first_name: "John", last_name: "Michael Smith"}`.
pub fn split_name(value: &Value) -> Value {
    let Some(raw) = value.as_str() else {
        tracing::warn!(value = %value, "split_name expects a string");
        return value.clone();
    };
    let mut parts = raw.split_whitespace();
    let Some(first) = parts.next() else {
        return Value::Object(Map::new());
    };
    let last = parts.collect::<Vec<_>>().join(" ");

    let mut out = Map::new();
    out.insert("first_name".to_string(), Value::String(first.to_string()));
    out.insert("last_name".to_string(), Value::String(last));
    Value::Object(out)
}

/// Keep only the keys named in `config.mapping`, renamed to their targets.
pub fn object_mapping(value: &Value, config: &JsonMap) -> Value {
    let Value::Object(source) = value else {
        return value.clone();
    };
    let mut out = Map::new();
    if let Some(Value::Object(mapping)) = config.get("mapping") {
        for (source_key, target_key) in mapping {
            let Some(target_key) = target_key.as_str() else {
                continue;
            };
            if let Some(v) = source.get(source_key) {
                out.insert(target_key.to_string(), v.clone());
            }
        }
    }
    Value::Object(out)
}

/// `format`: `phone_clean`, `unique` or `sorted`; anything else passes through.
pub fn array_format(value: &Value, config: &JsonMap) -> Value {
    let Value::Array(items) = value else {
        return value.clone();
    };
    match config_str(config, "format").unwrap_or("none") {
        "phone_clean" => Value::Array(
            items
                .iter()
                .map(|item| Value::String(clean_phone(&value_to_string(item))))
                .collect(),
        ),
        "unique" => {
            let mut out: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !out.contains(item) {
                    out.push(item.clone());
                }
            }
            Value::Array(out)
        }
        "sorted" => match sorted(items) {
            Some(out) => Value::Array(out),
            None => {
                tracing::warn!("array elements are not mutually comparable; leaving order unchanged");
                value.clone()
            }
        },
        _ => value.clone(),
    }
}

fn sorted(items: &[Value]) -> Option<Vec<Value>> {
    let mut out = items.to_vec();
    if items.iter().all(Value::is_number) {
        out.sort_by(|a, b| {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        });
        Some(out)
    } else if items.iter().all(Value::is_string) {
        out.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        Some(out)
    } else {
        None
    }
}

/// Case-insensitive lookup of `value` in `config.conditions`, else `config.default`, else `value`.
pub fn conditional(value: &Value, config: &JsonMap) -> Value {
    let needle = value_to_string(value).to_lowercase();
    if let Some(Value::Object(conditions)) = config.get("conditions") {
        for (candidate, target) in conditions {
            if candidate.to_lowercase() == needle {
                return target.clone();
            }
        }
    }
    config.get("default").cloned().unwrap_or_else(|| value.clone())
}
