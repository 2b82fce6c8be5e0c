use std::collections::BTreeMap;

use lendflow_core::types::JsonMap;
use lendflow_core::{
    apply_field_mappings, path, value_to_string, FieldMapping, Lender, Step, ValidationWarning,
};
use serde_json::Value as JsonValue;

use crate::executor::auth::resolve_auth;
use crate::executor::http::HttpRequestParts;

/// Data a step request is assembled from.
#[derive(Debug, Clone, Copy)]
pub struct RequestSources<'a> {
    /// Applicant payload read by field mappings.
    pub input: &'a JsonMap,
    /// Outputs extracted by earlier steps of the run, keyed by output path.
    pub prior_outputs: &'a JsonMap,
    pub field_mappings: &'a [FieldMapping],
    /// Starting body; dependency and mapping values are written on top.
    pub seed_body: Option<&'a JsonMap>,
}

#[derive(Debug, Clone)]
pub struct BuiltRequest {
    pub method: String,
    pub url: url::Url,
    pub headers: BTreeMap<String, String>,
    /// `None` for methods that carry no body.
    pub body: Option<JsonValue>,
    /// Headers carrying credentials placed by auth resolution.
    pub credential_headers: Vec<String>,
    pub warnings: Vec<ValidationWarning>,
}

impl BuiltRequest {
    pub fn to_parts(&self) -> HttpRequestParts {
        HttpRequestParts {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self
                .body
                .as_ref()
                .map(|b| b.to_string().into_bytes())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestBuildError {
    #[error("invalid request url '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

pub fn build_request(
    step: &Step,
    lender: &Lender,
    sources: RequestSources<'_>,
) -> Result<BuiltRequest, RequestBuildError> {
    let method = step.method();
    let sends_body = !matches!(method.as_str(), "GET" | "DELETE");

    let empty = JsonMap::new();
    let auth_config = step
        .auth_config
        .as_ref()
        .filter(|c| !c.is_empty())
        .or(lender.auth_config.as_ref())
        .unwrap_or(&empty);
    let auth = resolve_auth(step.auth_type.unwrap_or_default(), auth_config);

    let headers_in = step.request_headers.clone().unwrap_or_default();
    let mut headers = BTreeMap::new();
    if !headers_in
        .keys()
        .any(|k| k.eq_ignore_ascii_case("content-type"))
    {
        headers.insert("Content-Type".to_string(), "application/json".to_string());
    }
    headers.extend(headers_in);
    let mut credential_headers = Vec::new();
    for (name, value) in auth.headers {
        credential_headers.push(name.clone());
        headers.insert(name, value);
    }

    let mut body = sources.seed_body.cloned().unwrap_or_default();
    for (target, source_key) in &step.depends_on_fields {
        match sources.prior_outputs.get(source_key).filter(|v| !v.is_null()) {
            Some(v) => path::set(&mut body, target, v.clone()),
            None => tracing::debug!(
                step_id = step.id,
                source = %source_key,
                "dependency value not available from earlier steps"
            ),
        }
    }
    let warnings = apply_field_mappings(sources.input, sources.field_mappings, &mut body);

    let schema = step.request_schema.as_ref();
    if let Some(JsonValue::Object(template)) = schema.and_then(|s| s.template.as_ref()) {
        body = merge_onto_template(template, body);
    }
    if sends_body {
        if let Some((key, value)) = auth.body {
            body.insert(key, value);
        }
    }

    let mut url = parse_url(&join_url(&lender.base_url, &step.api_endpoint))?;
    let mut query_pairs = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect::<Vec<_>>();
    if let Some(params) = schema.and_then(|s| s.query_params.as_ref()) {
        for (k, v) in params.iter().filter(|(_, v)| !v.is_null()) {
            upsert_pair(&mut query_pairs, k.clone(), value_to_string(v));
        }
    }
    if let Some((k, v)) = auth.query {
        upsert_pair(&mut query_pairs, k, v);
    }
    if query_pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&query_pairs);
    }

    Ok(BuiltRequest {
        method,
        url,
        headers,
        body: sends_body.then_some(JsonValue::Object(body)),
        credential_headers,
        warnings,
    })
}

/// Absolute `http(s)` endpoints are used as-is; anything else is appended to
/// `base_url` with exactly one `/` at the seam.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") || base_url.is_empty() {
        return endpoint.to_string();
    }
    match (base_url.ends_with('/'), endpoint.starts_with('/')) {
        (true, true) => format!("{}{}", &base_url[..base_url.len() - 1], endpoint),
        (false, false) => format!("{base_url}/{endpoint}"),
        _ => format!("{base_url}{endpoint}"),
    }
}

/// Template keys are defaults. Body values win; object values merge one level
/// deep with the template's object under the same key.
fn merge_onto_template(template: &JsonMap, body: JsonMap) -> JsonMap {
    let mut merged = template.clone();
    for (k, v) in body {
        let value = match (v, template.get(&k)) {
            (JsonValue::Object(inner), Some(JsonValue::Object(base))) => {
                let mut m = base.clone();
                m.extend(inner);
                JsonValue::Object(m)
            }
            (v, _) => v,
        };
        merged.insert(k, value);
    }
    merged
}

fn upsert_pair(pairs: &mut Vec<(String, String)>, key: String, value: String) {
    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => pairs.push((key, value)),
    }
}

fn parse_url(raw: &str) -> Result<url::Url, RequestBuildError> {
    url::Url::parse(raw).map_err(|e| RequestBuildError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })
}
