//! Wire types for the token endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for the login endpoint.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from the login endpoint.
#[derive(Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
}

/// Request body for the renewal endpoint.
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response from the renewal endpoint. `refresh` is only present when the
/// server rotates refresh credentials.
#[derive(Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Keys checked, in order, for a human-readable message in error bodies.
const MESSAGE_KEYS: [&str; 3] = ["detail", "error", "message"];

/// Extract the server's error message from a JSON error body.
pub fn error_message(body: &Value) -> Option<String> {
    MESSAGE_KEYS
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn refresh_response_without_rotation() {
        let body: RefreshResponse = serde_json::from_value(json!({ "access": "a" })).unwrap();
        assert_eq!(body.access, "a");
        assert!(body.refresh.is_none());
    }

    #[test]
    fn error_message_prefers_detail() {
        let body = json!({ "message": "m", "detail": "d" });
        assert_eq!(error_message(&body).as_deref(), Some("d"));
    }

    #[test]
    fn error_message_ignores_non_strings() {
        let body = json!({ "error": { "code": 7 }, "message": "fallback" });
        assert_eq!(error_message(&body).as_deref(), Some("fallback"));
        assert_eq!(error_message(&json!({ "username": ["taken"] })), None);
    }
}
