//! Error types for reelpass.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, and input validation errors, plus
//! the field-level validation errors returned by login form checks.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The unified error type for reelpass operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (expired session, rejected refresh credential).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (non-success HTTP status, unexpected bodies).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (malformed URLs, configuration values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
///
/// These are cloneable because a single renewal outcome is delivered to
/// every caller attached to the in-flight refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A protected endpoint answered 401.
    #[error("session expired")]
    SessionExpired,

    /// There is no refresh credential to renew with.
    #[error("no refresh credential")]
    NoRefreshCredential,

    /// The renewal endpoint rejected the refresh credential.
    #[error("refresh credential rejected (HTTP {status})")]
    RefreshRejected { status: u16 },

    /// The renewal endpoint could not be reached.
    #[error("refresh unavailable: {message}")]
    RefreshUnavailable { message: String },

    /// The session is logged out until the next login.
    #[error("logged out")]
    LoggedOut,

    /// A login or logout happened while the renewal was in flight.
    #[error("refresh superseded by a newer session")]
    Superseded,
}

impl AuthError {
    /// Whether this failure ends the session and requires a fresh login.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AuthError::SessionExpired)
    }
}

/// Protocol-level errors from HTTP responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error message from the server (if present).
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid endpoint path.
    #[error("invalid endpoint '{value}': {reason}")]
    Endpoint { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Field-level validation errors for user-submitted forms.
///
/// Serializes as `{"field": ["message", ...]}`, the shape form views render
/// inline next to each input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    /// Messages recorded for a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns true if no field has errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, messages)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.0.iter().map(|(field, messages)| (*field, messages.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_serialize_as_map() {
        let mut errors = FieldErrors::new();
        errors.add("username", "Username is required");
        errors.add("password", "Password is required");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "password": ["Password is required"],
                "username": ["Username is required"],
            })
        );
    }

    #[test]
    fn field_errors_display_joins_messages() {
        let mut errors = FieldErrors::new();
        errors.add("username", "Username is required");
        assert_eq!(errors.to_string(), "username: Username is required");
        assert!(errors.get("password").is_empty());
    }

    #[test]
    fn only_session_expired_is_recoverable() {
        assert!(!AuthError::SessionExpired.is_fatal());
        assert!(AuthError::NoRefreshCredential.is_fatal());
        assert!(AuthError::RefreshRejected { status: 401 }.is_fatal());
        assert!(AuthError::LoggedOut.is_fatal());
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::new(401, Some("Token is invalid or expired".into()));
        assert_eq!(err.to_string(), "HTTP 401: Token is invalid or expired");
        assert!(err.is_auth_error());
        assert_eq!(ProtocolError::new(500, None).to_string(), "HTTP 500");
    }
}
