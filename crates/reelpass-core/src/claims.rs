//! Unverified access token claim decoding.
//!
//! The decoder reads the payload segment of a JWT-shaped access token to
//! learn its expiry and privilege flag. The signature is never checked, so
//! the result is a presentation hint: it decides what the UI shows, never
//! what the server allows.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::trace;

/// Claim name carrying the privilege flag when none is configured.
pub const DEFAULT_PRIVILEGE_CLAIM: &str = "is_admin";

/// Fields decoded from an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    /// When the token stops being valid. Malformed tokens report
    /// [`DateTime::<Utc>::MIN_UTC`], so they are always expired.
    pub expires_at: DateTime<Utc>,
    /// The privilege claim, `false` unless the payload holds literal `true`.
    pub is_privileged: bool,
}

impl Claims {
    /// Claims of a token that could not be decoded.
    pub const UNAUTHENTICATED: Claims = Claims {
        expires_at: DateTime::<Utc>::MIN_UTC,
        is_privileged: false,
    };

    /// A token is expired when its expiry lies strictly before `now`.
    /// A token expiring exactly at `now` is still accepted.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Whether the token is expired at the current instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether an `exp` claim was actually decoded.
    pub fn has_expiry(&self) -> bool {
        self.expires_at != DateTime::<Utc>::MIN_UTC
    }
}

/// Why a token could not be decoded. Kept internal: callers always get
/// [`Claims::UNAUTHENTICATED`] instead.
#[derive(Debug, thiserror::Error)]
enum MalformedCredential {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("payload is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decodes expiry and privilege claims without verifying signatures.
#[derive(Debug, Clone)]
pub struct ClaimsDecoder {
    privilege_claim: String,
}

impl Default for ClaimsDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_PRIVILEGE_CLAIM)
    }
}

impl ClaimsDecoder {
    /// Create a decoder reading the privilege flag from `privilege_claim`.
    pub fn new(privilege_claim: impl Into<String>) -> Self {
        Self {
            privilege_claim: privilege_claim.into(),
        }
    }

    /// Returns the claim name holding the privilege flag.
    pub fn privilege_claim(&self) -> &str {
        &self.privilege_claim
    }

    /// Decode a token. Never fails: malformed or empty input yields
    /// [`Claims::UNAUTHENTICATED`].
    pub fn decode(&self, token: &str) -> Claims {
        match self.try_decode(token) {
            Ok(claims) => claims,
            Err(err) => {
                trace!(error = %err, "Treating malformed access token as unauthenticated");
                Claims::UNAUTHENTICATED
            }
        }
    }

    fn try_decode(&self, token: &str) -> Result<Claims, MalformedCredential> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next()) {
            (Some(_), Some(payload)) if !payload.is_empty() => payload,
            _ => return Err(MalformedCredential::MissingPayload),
        };

        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        let payload: serde_json::Map<String, Value> = serde_json::from_slice(&bytes)?;

        let expires_at = payload
            .get("exp")
            .and_then(Value::as_i64)
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let is_privileged = payload
            .get(&self.privilege_claim)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Claims {
            expires_at,
            is_privileged,
        })
    }
}
