//! Authenticated requests with a single renewal-and-retry on 401.

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use reelpass_core::error::Error;
use reelpass_core::{AccessToken, AuthError, RefreshTrigger, SessionRefresher};

use crate::http::{HttpClient, map_reqwest, parse_error_response};

/// Message reported for transport-level failures.
pub const NETWORK_ERROR: &str = "Network error";

/// Message reported when the session cannot authorize a request.
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Normalized failure of an authenticated request.
///
/// Serializes as `{"error": ..., "status": ...}`, the shape UI
/// collaborators already branch on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{error} (HTTP {status})")]
pub struct RequestError {
    pub error: String,
    pub status: u16,
}

impl RequestError {
    /// Create an error with the given message and status.
    pub fn new(error: impl Into<String>, status: u16) -> Self {
        Self {
            error: error.into(),
            status,
        }
    }

    /// The request could not be authorized, even after a renewal.
    pub fn unauthorized() -> Self {
        Self::new(UNAUTHORIZED, 401)
    }

    /// The request never produced a response.
    pub fn network() -> Self {
        Self::new(NETWORK_ERROR, 500)
    }

    /// Whether the caller should send the user to the login view.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Method, body and extras of an authenticated request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    body: Option<Value>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    /// Options for a request with the given method and nothing else.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::POST).body(body)
    }

    pub fn patch(body: Value) -> Self {
        Self::new(Method::PATCH).body(body)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Set the JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append a request header. `Authorization` is always set from the
    /// session and should not be passed here.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// Result of one attempt that did not fail outright.
enum Attempt {
    Done(Value),
    Unauthorized(RequestError),
}

/// HTTP client that attaches the session's access token and, when a
/// protected endpoint answers 401, renews once through the shared
/// refresher before retrying.
#[derive(Clone)]
pub struct ResilientClient {
    http: HttpClient,
    refresher: SessionRefresher,
    refresh_on_expiry: bool,
}

impl ResilientClient {
    /// Create a client sending through `http` and renewing through
    /// `refresher`.
    pub fn new(http: HttpClient, refresher: SessionRefresher, refresh_on_expiry: bool) -> Self {
        Self {
            http,
            refresher,
            refresh_on_expiry,
        }
    }

    /// Send a request to `target`, a path below the API base or an absolute
    /// URL, and return the decoded body.
    ///
    /// Success bodies are parsed as JSON; an empty body yields
    /// [`Value::Null`] and a body that is not JSON yields [`Value::String`].
    /// A 401 leads to at most one retry. The retry uses the stored token when
    /// a renewal already replaced the rejected one, and otherwise the token a
    /// fresh renewal produced.
    ///
    /// Absolute targets on another origin are sent without credentials and
    /// never renew the session.
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn request(
        &self,
        target: &str,
        options: &RequestOptions,
    ) -> Result<Value, RequestError> {
        let url = self.http.api().endpoint(target).map_err(|err| {
            warn!(error = %err, "Invalid request target");
            RequestError::network()
        })?;

        if !self.http.api().is_same_origin(&url) {
            debug!(%url, "Foreign origin, sending without credentials");
            return match self.attempt(&url, options, None).await? {
                Attempt::Done(body) => Ok(body),
                Attempt::Unauthorized(err) => Err(err),
            };
        }

        let Some(token) = self.current_token().await else {
            debug!("No usable access token");
            return Err(RequestError::unauthorized());
        };

        match self.attempt(&url, options, Some(&token)).await? {
            Attempt::Done(body) => Ok(body),
            Attempt::Unauthorized(_) => {
                let retry = match self.refresher.session().access_token() {
                    Some(stored) if stored != token => {
                        debug!(%url, "Token was renewed while the request was in flight");
                        stored
                    }
                    _ => {
                        info!(%url, "Request unauthorized, renewing once");
                        self.refresher
                            .refresh(RefreshTrigger::Unauthorized)
                            .await
                            .map_err(rejected)?
                    }
                };

                match self.attempt(&url, options, Some(&retry)).await? {
                    Attempt::Done(body) => Ok(body),
                    Attempt::Unauthorized(_) => Err(rejected(AuthError::SessionExpired)),
                }
            }
        }
    }

    /// Like [`request`](Self::request), decoding the body into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        target: &str,
        options: &RequestOptions,
    ) -> Result<T, RequestError> {
        let body = self.request(target, options).await?;
        serde_json::from_value(body).map_err(|err| {
            warn!(error = %err, "Response body has an unexpected shape");
            RequestError::new(format!("Invalid response body: {}", err), 500)
        })
    }

    /// The token to send first: the stored one, or a renewed one when it is
    /// missing or has expired.
    async fn current_token(&self) -> Option<AccessToken> {
        let session = self.refresher.session();
        match session.access_token() {
            Some(token) if self.refresh_on_expiry => {
                let claims = session.decoder().decode(token.as_str());
                if claims.has_expiry() && claims.is_expired() {
                    debug!("Access token expired, renewing before request");
                    self.refresher.refresh(RefreshTrigger::Expired).await.ok()
                } else {
                    Some(token)
                }
            }
            Some(token) => Some(token),
            None => self.refresher.refresh(RefreshTrigger::Expired).await.ok(),
        }
    }

    async fn attempt(
        &self,
        url: &str,
        options: &RequestOptions,
        token: Option<&AccessToken>,
    ) -> Result<Attempt, RequestError> {
        let response = self
            .http
            .send(
                options.method.clone(),
                url,
                token,
                &options.query,
                &options.headers,
                options.body.as_ref(),
            )
            .await
            .map_err(|err| {
                warn!(error = %err, "Request failed in transport");
                RequestError::network()
            })?;

        let status = response.status();
        debug!(%status, "Response");

        if !status.is_success() {
            let error = parse_error_response(response).await;
            let failure = RequestError::new(
                error
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("HTTP {}", error.status)),
                error.status,
            );
            if error.is_auth_error() {
                return Ok(Attempt::Unauthorized(failure));
            }
            return Err(failure);
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Attempt::Done(Value::Null));
        }

        let text = response.text().await.map_err(|err| {
            let err: Error = map_reqwest(err);
            warn!(error = %err, "Failed to read response body");
            RequestError::network()
        })?;

        Ok(Attempt::Done(decode_body(&text)))
    }
}

/// Log why the session could not authorize a request and map it to the
/// 401 callers branch on.
fn rejected(err: AuthError) -> RequestError {
    if err.is_fatal() {
        warn!(error = %err, "Renewal failed, login required");
    } else {
        info!(error = %err, "Access token still rejected after retry");
    }
    RequestError::unauthorized()
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_error_serializes_flat() {
        let value = serde_json::to_value(RequestError::network()).unwrap();
        assert_eq!(value, json!({ "error": "Network error", "status": 500 }));
    }

    #[test]
    fn decode_body_variants() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("  \n"), Value::Null);
        assert_eq!(decode_body(r#"{"id":1}"#), json!({ "id": 1 }));
        assert_eq!(decode_body("Movie returned"), json!("Movie returned"));
    }

    #[test]
    fn rejected_maps_every_auth_failure_to_401() {
        for err in [
            AuthError::SessionExpired,
            AuthError::NoRefreshCredential,
            AuthError::RefreshRejected { status: 401 },
            AuthError::LoggedOut,
        ] {
            assert_eq!(rejected(err), RequestError::unauthorized());
        }
    }

    #[test]
    fn options_builders() {
        let options = RequestOptions::post(json!({ "movie": 3 }))
            .query("page", "2")
            .header("X-Trace", "abc");
        assert_eq!(options.method(), &Method::POST);
        assert_eq!(options.body, Some(json!({ "movie": 3 })));
        assert_eq!(options.query, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(RequestOptions::default().method(), &Method::GET);
    }
}
