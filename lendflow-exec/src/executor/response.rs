use lendflow_core::path;
use lendflow_core::types::JsonMap;
use serde_json::{json, Value as JsonValue};

use crate::executor::http::HttpResponseParts;

/// JSON body, or `{"raw": <text>}` when the body is not JSON.
pub fn parse_body(resp: &HttpResponseParts) -> JsonValue {
    serde_json::from_slice(&resp.body).unwrap_or_else(|_| json!({ "raw": raw_text(resp) }))
}

/// Object bodies are logged as-is; anything else is logged as its raw text.
pub fn body_for_log(resp: &HttpResponseParts, parsed: &JsonValue) -> JsonValue {
    if parsed.is_object() {
        parsed.clone()
    } else {
        json!({ "raw": raw_text(resp) })
    }
}

/// Values at `output_fields` keyed by the path string exactly as declared.
pub fn extract_outputs(body: &JsonValue, output_fields: &[String]) -> JsonMap {
    let mut out = JsonMap::new();
    let JsonValue::Object(map) = body else {
        return out;
    };
    for field in output_fields {
        if let Some(v) = path::get_present(map, field) {
            out.insert(field.clone(), v.clone());
        }
    }
    out
}

fn raw_text(resp: &HttpResponseParts) -> String {
    String::from_utf8_lossy(&resp.body).into_owned()
}
