//! Applying lender field mappings to an applicant payload.

use serde_json::{Map, Value};

use crate::path;
use crate::transform::transform;
use crate::types::FieldMapping;

/// A required mapping that produced no value. The mapping is skipped, not fatal.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationWarning {
    pub mapping: String,
    pub target: String,
    pub message: String,
}

/// Write every active mapping's value into `body`.
///
/// The value is the transformed source value when that is non-null, else the
/// mapping's `default_value`, else its `fallback_value`. Mappings that yield
/// nothing leave `body` untouched; required ones are reported.
pub fn apply_field_mappings(
    input: &Map<String, Value>,
    mappings: &[FieldMapping],
    body: &mut Map<String, Value>,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    for mapping in mappings.iter().filter(|m| m.is_active) {
        match resolve(input, mapping) {
            Some(value) => path::set(body, mapping.target_path(), value),
            None if mapping.is_required => {
                tracing::warn!(
                    source = mapping.source_path(),
                    target = mapping.target_path(),
                    "required field mapping produced no value"
                );
                warnings.push(ValidationWarning {
                    mapping: mapping_label(mapping),
                    target: mapping.target_path().to_string(),
                    message: format!(
                        "required field '{}' produced no value; mapping skipped",
                        mapping.source_path()
                    ),
                });
            }
            None => {}
        }
    }
    warnings
}

/// Copy of `payload` with each active mapping's transformed source value written
/// to its target. Mappings whose source is absent are ignored; defaults do not apply.
pub fn overlay_field_mappings(
    payload: &Map<String, Value>,
    mappings: &[FieldMapping],
) -> Map<String, Value> {
    let mut out = payload.clone();
    for mapping in mappings.iter().filter(|m| m.is_active) {
        let Some(source) = path::get_present(payload, mapping.source_path()) else {
            continue;
        };
        let value = transform(
            source,
            mapping.transformation_type,
            &mapping.transformation_config,
        );
        path::set(&mut out, mapping.target_path(), value);
    }
    out
}

fn resolve(input: &Map<String, Value>, mapping: &FieldMapping) -> Option<Value> {
    path::get_present(input, mapping.source_path())
        .map(|v| {
            transform(
                v,
                mapping.transformation_type,
                &mapping.transformation_config,
            )
        })
        .filter(|v| !v.is_null())
        .or_else(|| mapping.default_value.clone().filter(|v| !v.is_null()))
        .or_else(|| mapping.fallback_value.clone().filter(|v| !v.is_null()))
}

fn mapping_label(mapping: &FieldMapping) -> String {
    if mapping.name.is_empty() {
        mapping.source_field.clone()
    } else {
        mapping.name.clone()
    }
}
