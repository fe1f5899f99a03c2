//! Helpers shared by unit tests.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde_json::json;

/// An unsigned JWT expiring `expires_in` seconds from now.
pub(crate) fn jwt(expires_in: i64, is_admin: bool) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = json!({
        "exp": Utc::now().timestamp() + expires_in,
        "is_admin": is_admin,
    });
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.unsigned", header, body)
}
