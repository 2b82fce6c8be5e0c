use std::collections::BTreeMap;

const REDACTED: &str = "<redacted>";

/// Lowercased header names that are always redacted in persisted logs.
const ALWAYS_REDACT: [&str; 3] = ["authorization", "cookie", "set-cookie"];

/// Copy of `headers` safe to persist. `credential_headers` are the names auth
/// resolution wrote into the request.
pub fn sanitize_headers(
    headers: &BTreeMap<String, String>,
    credential_headers: &[String],
) -> BTreeMap<String, String> {
    let mut out = headers.clone();
    for name in ALWAYS_REDACT
        .iter()
        .copied()
        .chain(credential_headers.iter().map(String::as_str))
    {
        redact_case_insensitive(&mut out, name);
    }
    out
}

fn redact_case_insensitive(map: &mut BTreeMap<String, String>, header: &str) {
    let keys = map
        .keys()
        .filter(|k| k.eq_ignore_ascii_case(header))
        .cloned()
        .collect::<Vec<_>>();
    for k in keys {
        map.insert(k, REDACTED.to_string());
    }
}
