use std::collections::HashSet;

use crate::types::{ExecutionMode, Predicate, SequenceDocument};
use crate::validate::rules::step;
use crate::validate::validator::Validator;

pub(crate) fn validate_sequence(v: &mut Validator, doc: &SequenceDocument) {
    let seq = &doc.sequence;
    if seq.name.trim().is_empty() {
        v.push("$.name", "must not be empty");
    }
    if doc.steps.is_empty() {
        v.push("$.steps", "must have at least one entry");
        return;
    }

    validate_ordering(v, doc);

    let first_order = doc.steps.iter().map(|s| s.sequence_order).min();
    for (idx, s) in doc.steps.iter().enumerate() {
        let spath = format!("$.steps[{idx}]");
        step::validate_step(v, s, &spath);

        if s.depends_on_fields.is_empty() {
            continue;
        }
        match seq.execution_mode {
            ExecutionMode::Parallel => v.push(
                format!("{spath}.depends_on_fields"),
                "steps in a parallel sequence cannot depend on other steps",
            ),
            ExecutionMode::Sequential if Some(s.sequence_order) == first_order => v.push(
                format!("{spath}.depends_on_fields"),
                "the first step of a sequential sequence has nothing to depend on",
            ),
            _ => {}
        }
    }

    for (step_key, conditions) in &seq.condition_config {
        for (field, condition) in conditions {
            if condition.predicate == Predicate::Unknown {
                v.push(
                    format!("$.condition_config.{step_key}.{field}.type"),
                    "must be one of equals, not_equals, exists, greater_than, less_than",
                );
            }
        }
    }
}

/// `sequence_order` must be exactly `1..=n` in some arrangement.
fn validate_ordering(v: &mut Validator, doc: &SequenceDocument) {
    let mut seen = HashSet::new();
    for (idx, s) in doc.steps.iter().enumerate() {
        if !seen.insert(s.sequence_order) {
            v.push(
                format!("$.steps[{idx}].sequence_order"),
                "must be unique within the sequence",
            );
        }
    }
    let n = doc.steps.len() as i32;
    for (idx, s) in doc.steps.iter().enumerate() {
        if s.sequence_order < 1 || s.sequence_order > n {
            v.push(
                format!("$.steps[{idx}].sequence_order"),
                format!("must be between 1 and {n} (orders are 1-based with no gaps)"),
            );
        }
    }
}
