//! Credential types.

use std::fmt;

/// A short-lived access credential used as a bearer token.
///
/// Access tokens stay readable by application code: UI collaborators
/// decode the privilege claim from them directly. Anything able to run
/// code in the client can read them too.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Claims decoded from it are hints for presentation only
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A long-lived refresh credential exchanged for new access tokens.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
/// - Only the session refresher and storage backends read the raw value
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw secret.
    ///
    /// # Security
    ///
    /// Intended for token store backends persisting the value and for the
    /// renewal request. Application code should only ever need
    /// `SessionContext::has_refresh_credential`.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// Credentials returned by a successful login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: AccessToken,
    pub refresh: RefreshToken,
}

/// Result of a successful renewal.
#[derive(Debug, Clone)]
pub struct Renewal {
    pub access: AccessToken,
    /// A rotated refresh credential, when the server issues one.
    pub refresh: Option<RefreshToken>,
}
