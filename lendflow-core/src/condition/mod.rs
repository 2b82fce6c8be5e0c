//! Step gating for conditional sequences.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::path;
use crate::types::{Condition, ConditionConfig, Predicate, Step};

/// Whether `step` should run given the data accumulated so far in the run.
///
/// A step without an entry in `config` always runs. Conditions are keyed by the
/// decimal step id.
pub fn should_execute(step: &Step, config: &ConditionConfig, data: &Map<String, Value>) -> bool {
    match config.get(&step.id.to_string()) {
        Some(conditions) => evaluate(conditions, data),
        None => true,
    }
}

/// All conditions must hold. Unknown predicate kinds are ignored.
pub fn evaluate(conditions: &BTreeMap<String, Condition>, data: &Map<String, Value>) -> bool {
    conditions
        .iter()
        .all(|(field, condition)| holds(condition, lookup(data, field)))
}

/// Extracted outputs are keyed by their declared path string, so the flat key
/// wins over a nested walk.
fn lookup<'a>(data: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    data.get(field).or_else(|| path::get(data, field))
}

fn holds(condition: &Condition, actual: Option<&Value>) -> bool {
    let expected = condition.value.as_ref().unwrap_or(&Value::Null);
    let actual_or_null = actual.unwrap_or(&Value::Null);
    match condition.predicate {
        Predicate::Equals => json_eq(actual_or_null, expected),
        Predicate::NotEquals => !json_eq(actual_or_null, expected),
        Predicate::Exists => match actual_or_null {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        },
        Predicate::GreaterThan => compare(actual_or_null, expected).is_some_and(|(a, b)| a > b),
        Predicate::LessThan => compare(actual_or_null, expected).is_some_and(|(a, b)| a < b),
        Predicate::Unknown => {
            tracing::warn!("unknown condition type; treating as satisfied");
            true
        }
    }
}

/// Numbers compare by value so `1` equals `1.0`.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(actual: &Value, expected: &Value) -> Option<(f64, f64)> {
    Some((actual.as_f64()?, expected.as_f64()?))
}
