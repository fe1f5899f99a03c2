//! Configuration for the session layer.

use std::time::Duration;

use crate::claims::DEFAULT_PRIVILEGE_CLAIM;
use crate::error::{Error, InvalidInputError};
use crate::guard::RouteTable;
use crate::types::ApiUrl;

/// Default login endpoint path.
pub const DEFAULT_LOGIN_PATH: &str = "/api/token/";

/// Default renewal endpoint path.
pub const DEFAULT_REFRESH_PATH: &str = "/api/token/refresh/";

/// Configuration for an authenticated API session.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the remote API.
    pub api_url: ApiUrl,

    /// Path of the login endpoint, relative to `api_url`.
    pub login_path: String,

    /// Path of the renewal endpoint, relative to `api_url`.
    pub refresh_path: String,

    /// Period of the background refresh tick.
    pub refresh_interval: Duration,

    /// Claim holding the privilege flag in access tokens.
    pub privilege_claim: String,

    /// Persist a rotated refresh credential when the renewal endpoint
    /// returns one.
    pub rotate_refresh: bool,

    /// Renew before sending a request whose access token has expired.
    pub refresh_on_expiry: bool,

    /// Transport timeout for every HTTP call.
    pub timeout: Duration,

    /// Routes known to the navigation guard.
    pub routes: RouteTable,
}

impl AuthConfig {
    /// Create a configuration for the given API with default settings.
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            api_url,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            refresh_interval: Duration::from_secs(10 * 60),
            privilege_claim: DEFAULT_PRIVILEGE_CLAIM.to_string(),
            rotate_refresh: false,
            refresh_on_expiry: true,
            timeout: Duration::from_secs(30),
            routes: RouteTable::default(),
        }
    }

    /// Build a configuration from `REELPASS_*` environment variables.
    ///
    /// `REELPASS_HOST` is required; `REELPASS_ENDPOINT_LOGIN`,
    /// `REELPASS_ENDPOINT_REFRESH` and `REELPASS_ROTATE_REFRESH` are optional.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let host = lookup("REELPASS_HOST").ok_or_else(|| InvalidInputError::Other {
            message: "REELPASS_HOST is not set".to_string(),
        })?;

        let mut config = Self::new(ApiUrl::new(host)?);
        if let Some(path) = lookup("REELPASS_ENDPOINT_LOGIN") {
            config = config.login_path(path);
        }
        if let Some(path) = lookup("REELPASS_ENDPOINT_REFRESH") {
            config = config.refresh_path(path);
        }
        if let Some(flag) = lookup("REELPASS_ROTATE_REFRESH") {
            config = config.rotate_refresh(parse_flag(&flag)?);
        }
        Ok(config)
    }

    /// Set the login endpoint path.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set the renewal endpoint path.
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Set the background refresh period.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the claim holding the privilege flag.
    pub fn privilege_claim(mut self, claim: impl Into<String>) -> Self {
        self.privilege_claim = claim.into();
        self
    }

    /// Enable or disable refresh credential rotation.
    pub fn rotate_refresh(mut self, rotate: bool) -> Self {
        self.rotate_refresh = rotate;
        self
    }

    /// Enable or disable renewal ahead of requests with expired tokens.
    pub fn refresh_on_expiry(mut self, enabled: bool) -> Self {
        self.refresh_on_expiry = enabled;
        self
    }

    /// Set the transport timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the guard's route table.
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }
}

fn parse_flag(value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(InvalidInputError::Other {
            message: format!("expected a boolean, got '{}'", other),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn api() -> ApiUrl {
        ApiUrl::new("https://rentals.example.com").unwrap()
    }

    #[test]
    fn defaults() {
        let config = AuthConfig::new(api());
        assert_eq!(config.login_path, "/api/token/");
        assert_eq!(config.refresh_path, "/api/token/refresh/");
        assert_eq!(config.refresh_interval, Duration::from_secs(600));
        assert_eq!(config.privilege_claim, "is_admin");
        assert!(!config.rotate_refresh);
        assert!(config.refresh_on_expiry);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.routes.login, "/login");
    }

    #[test]
    fn builder_overrides() {
        let config = AuthConfig::new(api())
            .refresh_interval(Duration::from_secs(60))
            .rotate_refresh(true)
            .refresh_on_expiry(false)
            .privilege_claim("is_staff");

        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert!(config.rotate_refresh);
        assert!(!config.refresh_on_expiry);
        assert_eq!(config.privilege_claim, "is_staff");
    }

    #[test]
    fn from_lookup_reads_endpoints() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("REELPASS_HOST", "http://localhost:8000"),
            ("REELPASS_ENDPOINT_LOGIN", "/auth/login/"),
            ("REELPASS_ENDPOINT_REFRESH", "/auth/refresh/"),
            ("REELPASS_ROTATE_REFRESH", "yes"),
        ]);
        let config = AuthConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api_url.host(), Some("localhost"));
        assert_eq!(config.login_path, "/auth/login/");
        assert_eq!(config.refresh_path, "/auth/refresh/");
        assert!(config.rotate_refresh);
    }

    #[test]
    fn from_lookup_requires_host() {
        let err = AuthConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains("REELPASS_HOST"));
    }

    #[test]
    fn from_lookup_rejects_bad_flag() {
        let err = AuthConfig::from_lookup(|k| match k {
            "REELPASS_HOST" => Some("https://rentals.example.com".to_string()),
            "REELPASS_ROTATE_REFRESH" => Some("maybe".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }
}
