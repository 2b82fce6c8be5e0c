use std::collections::BTreeMap;

use lendflow_core::condition::{evaluate, should_execute};
use lendflow_core::types::{Condition, ConditionConfig};
use lendflow_core::Step;
use serde_json::{json, Map, Value};

fn data(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => panic!("expected object"),
    }
}

fn conditions(v: Value) -> BTreeMap<String, Condition> {
    serde_json::from_value(v).unwrap()
}

#[test]
fn equals_and_not_equals() {
    let d = data(json!({"status": "approved", "score": 700}));
    assert!(evaluate(&conditions(json!({"status": {"type": "equals", "value": "approved"}})), &d));
    assert!(evaluate(&conditions(json!({"score": {"type": "equals", "value": 700.0}})), &d));
    assert!(!evaluate(&conditions(json!({"status": {"type": "not_equals", "value": "approved"}})), &d));
    assert!(evaluate(&conditions(json!({"missing": {"type": "not_equals", "value": "x"}})), &d));
}

#[test]
fn exists_rejects_null_and_empty_string() {
    let d = data(json!({"a": "", "b": null, "c": 0}));
    let exists = |field: &str| {
        evaluate(&conditions(json!({ field: {"type": "exists"} })), &d)
    };
    assert!(!exists("a"));
    assert!(!exists("b"));
    assert!(exists("c"));
    assert!(!exists("d"));
}

#[test]
fn numeric_comparisons_need_numbers() {
    let d = data(json!({"score": 650, "label": "650"}));
    assert!(evaluate(&conditions(json!({"score": {"type": "greater_than", "value": 600}})), &d));
    assert!(!evaluate(&conditions(json!({"score": {"type": "less_than", "value": 600}})), &d));
    assert!(!evaluate(&conditions(json!({"label": {"type": "greater_than", "value": 1}})), &d));
    assert!(!evaluate(&conditions(json!({"missing": {"type": "less_than", "value": 1}})), &d));
}

#[test]
fn all_conditions_must_hold_and_unknown_types_pass() {
    let d = data(json!({"a": 1, "b": 2}));
    assert!(!evaluate(
        &conditions(json!({
            "a": {"type": "equals", "value": 1},
            "b": {"type": "equals", "value": 3}
        })),
        &d
    ));
    assert!(evaluate(&conditions(json!({"a": {"type": "matches_regex", "value": ".*"}})), &d));
}

#[test]
fn steps_without_conditions_always_run() {
    let mut step: Step = serde_json::from_value(json!({"id": 4, "api_endpoint": "/x"})).unwrap();
    let mut config = ConditionConfig::new();
    assert!(should_execute(&step, &config, &Map::new()));

    config.insert(
        "4".into(),
        conditions(json!({"approved": {"type": "equals", "value": true}})),
    );
    assert!(!should_execute(&step, &config, &data(json!({"approved": false}))));
    assert!(should_execute(&step, &config, &data(json!({"approved": true}))));

    step.id = 5;
    assert!(should_execute(&step, &config, &data(json!({"approved": false}))));
}
