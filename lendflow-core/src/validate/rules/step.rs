use crate::types::Step;
use crate::validate::validator::{Validator, ALLOWED_METHODS};

pub(crate) fn validate_step(v: &mut Validator, step: &Step, path: &str) {
    let method = step.method();
    if !ALLOWED_METHODS.contains(&method.as_str()) {
        v.push(
            format!("{path}.http_method"),
            format!("unsupported method '{}'", step.http_method),
        );
    }

    let endpoint = step.api_endpoint.trim();
    if endpoint.is_empty() {
        v.push(format!("{path}.api_endpoint"), "must not be empty");
    } else if !(endpoint.starts_with("http://")
        || endpoint.starts_with("https://")
        || endpoint.starts_with('/'))
    {
        v.push(
            format!("{path}.api_endpoint"),
            "must be an absolute http(s) URL or a path starting with '/'",
        );
    }

    if step.timeout_seconds == 0 {
        v.push(format!("{path}.timeout_seconds"), "must be greater than zero");
    }

    for (target, source) in &step.depends_on_fields {
        if target.trim().is_empty() || source.trim().is_empty() {
            v.push(
                format!("{path}.depends_on_fields"),
                "target path and source output key must both be non-empty",
            );
        }
    }

    for (idx, field) in step.output_fields.iter().enumerate() {
        if field.trim().is_empty() {
            v.push(format!("{path}.output_fields[{idx}]"), "must not be empty");
        }
    }
}
