use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use lendflow_core::types::JsonMap;
use lendflow_core::{value_to_string, AuthType};
use serde_json::Value as JsonValue;

const DEFAULT_HEADER_KEY_NAME: &str = "X-API-Key";
const DEFAULT_PARAM_KEY_NAME: &str = "api_key";

/// Where resolved credentials go in the outgoing request.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct AuthMaterial {
    pub headers: Vec<(String, String)>,
    pub query: Option<(String, String)>,
    pub body: Option<(String, JsonValue)>,
}

pub(crate) fn resolve_auth(auth_type: AuthType, config: &JsonMap) -> AuthMaterial {
    let mut out = AuthMaterial::default();
    match auth_type {
        AuthType::BearerToken => {
            if let Some(token) = first_present(config, &["token", "access_token"]) {
                out.headers.push((
                    "Authorization".to_string(),
                    format!("Bearer {}", value_to_string(token)),
                ));
            }
        }
        AuthType::ApiKey => {
            let Some(key_value) = first_present(config, &["key_value", "api_key"]) else {
                return out;
            };
            let location = config
                .get("key_location")
                .and_then(JsonValue::as_str)
                .unwrap_or("header");
            let key_name = |default: &str| {
                config
                    .get("key_name")
                    .filter(|v| !v.is_null())
                    .map(value_to_string)
                    .unwrap_or_else(|| default.to_string())
            };
            match location {
                "header" => out
                    .headers
                    .push((key_name(DEFAULT_HEADER_KEY_NAME), value_to_string(key_value))),
                "query" => {
                    out.query = Some((key_name(DEFAULT_PARAM_KEY_NAME), value_to_string(key_value)))
                }
                "body" => out.body = Some((key_name(DEFAULT_PARAM_KEY_NAME), key_value.clone())),
                other => tracing::warn!(key_location = other, "unknown api key location; key not sent"),
            }
        }
        AuthType::BasicAuth => {
            if let (Some(user), Some(pass)) = (
                first_present(config, &["username"]),
                first_present(config, &["password"]),
            ) {
                let raw = format!("{}:{}", value_to_string(user), value_to_string(pass));
                out.headers.push((
                    "Authorization".to_string(),
                    format!("Basic {}", STANDARD.encode(raw)),
                ));
            }
        }
        AuthType::Oauth2 | AuthType::Custom => {
            tracing::debug!(auth_type = auth_type.as_str(), "auth type adds no request material");
        }
        AuthType::None => {}
    }
    out
}

/// First key whose value is set: not null, not an empty string, not `false`.
fn first_present<'a>(config: &'a JsonMap, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter().filter_map(|k| config.get(*k)).find(|v| match v {
        JsonValue::Null | JsonValue::Bool(false) => false,
        JsonValue::String(s) => !s.is_empty(),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg(v: JsonValue) -> JsonMap {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn bearer_prefers_token_over_access_token() {
        let m = resolve_auth(
            AuthType::BearerToken,
            &cfg(json!({"token": "", "access_token": "abc"})),
        );
        assert_eq!(m.headers, vec![("Authorization".into(), "Bearer abc".into())]);
    }

    #[test]
    fn api_key_locations() {
        let header = resolve_auth(AuthType::ApiKey, &cfg(json!({"key_value": "k1"})));
        assert_eq!(header.headers, vec![("X-API-Key".into(), "k1".into())]);

        let query = resolve_auth(
            AuthType::ApiKey,
            &cfg(json!({"api_key": "k2", "key_location": "query"})),
        );
        assert_eq!(query.query, Some(("api_key".into(), "k2".into())));
        assert!(query.headers.is_empty());

        let body = resolve_auth(
            AuthType::ApiKey,
            &cfg(json!({"key_value": "k3", "key_location": "body", "key_name": "token"})),
        );
        assert_eq!(body.body, Some(("token".into(), json!("k3"))));
    }

    #[test]
    fn basic_needs_both_parts() {
        let m = resolve_auth(
            AuthType::BasicAuth,
            &cfg(json!({"username": "user", "password": "pass"})),
        );
        assert_eq!(m.headers[0].1, "Basic dXNlcjpwYXNz");
        assert!(resolve_auth(AuthType::BasicAuth, &cfg(json!({"username": "user"})))
            .headers
            .is_empty());
    }

    #[test]
    fn none_and_oauth2_add_nothing() {
        let c = cfg(json!({"token": "t"}));
        assert_eq!(resolve_auth(AuthType::None, &c), AuthMaterial::default());
        assert_eq!(resolve_auth(AuthType::Oauth2, &c), AuthMaterial::default());
    }
}
