//! The `Auth` facade: login, logout, requests and session state behind one
//! handle.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use reelpass_core::error::Error;
use reelpass_core::{
    AccessToken, AuthApi, AuthConfig, ClaimsDecoder, FieldErrors, GuardDecision, LoginForm,
    RefreshState, RefreshTrigger, Result, RouteGuard, SessionContext, SessionRefresher,
    SessionSnapshot, TokenStore,
};

use crate::api::HttpAuthApi;
use crate::http::HttpClient;
use crate::request::{NETWORK_ERROR, RequestError, RequestOptions, ResilientClient};

/// Message used when a login is refused without a server-provided reason.
const LOGIN_REJECTED: &str = "Invalid credentials";

/// Result of a login attempt.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// The form failed validation; nothing was sent.
    Invalid { errors: FieldErrors },
    /// Credentials were stored and the session is signed in.
    Authenticated { access: AccessToken },
    /// The server refused the credentials or could not be reached.
    Rejected { message: String },
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated { .. })
    }
}

/// Authenticated session against one remote API.
///
/// Cheap to clone; clones share the session, the refresher and the
/// connection pool.
#[derive(Clone)]
pub struct Auth {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    config: AuthConfig,
    api: HttpAuthApi,
    session: SessionContext,
    refresher: SessionRefresher,
    client: ResilientClient,
    guard: RouteGuard,
}

impl Auth {
    /// Build the session layer for `config`, keeping credentials in `store`.
    pub fn new(config: AuthConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let http = HttpClient::new(config.api_url.clone(), config.timeout)?;
        let api = HttpAuthApi::new(http.clone(), &config);

        let session = SessionContext::new(store, ClaimsDecoder::new(&config.privilege_claim));
        let refresher = SessionRefresher::new(
            Arc::new(api.clone()) as Arc<dyn AuthApi>,
            session.clone(),
            config.rotate_refresh,
        );
        let client = ResilientClient::new(http, refresher.clone(), config.refresh_on_expiry);
        let guard = RouteGuard::new(config.routes.clone());

        Ok(Self {
            inner: Arc::new(AuthInner {
                config,
                api,
                session,
                refresher,
                client,
                guard,
            }),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    /// Returns the session state handle.
    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    /// Returns the shared refresher.
    pub fn refresher(&self) -> &SessionRefresher {
        &self.inner.refresher
    }

    /// Returns the request client.
    pub fn client(&self) -> &ResilientClient {
        &self.inner.client
    }

    /// Run the startup refresh attempt, then release the loading gate.
    ///
    /// The attempt's failure is not an error: it leaves the session
    /// logged out, which the returned snapshot reflects.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> SessionSnapshot {
        match self.inner.refresher.refresh(RefreshTrigger::Startup).await {
            Ok(_) => info!("Session restored"),
            Err(err) => debug!(error = %err, "No session to restore"),
        }
        self.inner.session.finish_loading();
        self.inner.session.snapshot()
    }

    /// Validate the form, then exchange the credentials for tokens.
    #[instrument(skip_all)]
    pub async fn login(&self, form: &LoginForm) -> LoginOutcome {
        let credentials = match form.validate() {
            Ok(credentials) => credentials,
            Err(errors) => {
                debug!("Login form invalid");
                return LoginOutcome::Invalid { errors };
            }
        };

        match self.inner.api.login(&credentials).await {
            Ok(pair) => {
                let access = pair.access.clone();
                self.inner.refresher.begin_session(pair);
                LoginOutcome::Authenticated { access }
            }
            Err(Error::Protocol(err)) => {
                info!(status = err.status, "Login rejected");
                LoginOutcome::Rejected {
                    message: err.message.unwrap_or_else(|| LOGIN_REJECTED.to_string()),
                }
            }
            Err(err) => {
                warn!(error = %err, "Login failed");
                LoginOutcome::Rejected {
                    message: NETWORK_ERROR.to_string(),
                }
            }
        }
    }

    /// Forget both credentials. Any renewal still in flight is discarded.
    pub fn logout(&self) {
        self.inner.refresher.end_session();
    }

    /// Whether the refresher considers the session ended.
    pub fn is_logged_out(&self) -> bool {
        self.inner.refresher.state() == RefreshState::LoggedOut
    }

    /// Send an authenticated request. See [`ResilientClient::request`].
    pub async fn request(
        &self,
        target: &str,
        options: &RequestOptions,
    ) -> std::result::Result<Value, RequestError> {
        self.inner.client.request(target, options).await
    }

    /// Send an authenticated request and decode the body into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        target: &str,
        options: &RequestOptions,
    ) -> std::result::Result<T, RequestError> {
        self.inner.client.request_json(target, options).await
    }

    /// Decide whether navigation to `target` may proceed.
    pub fn guard(&self, target: &str) -> GuardDecision {
        self.inner
            .guard
            .evaluate(target, self.inner.session.guard_state())
    }

    /// Start the background refresh tick at the configured interval.
    pub fn spawn_refresh_ticker(&self) -> JoinHandle<()> {
        self.inner
            .refresher
            .spawn_ticker(self.inner.config.refresh_interval)
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("api_url", &self.inner.config.api_url.as_str())
            .field("session", &self.inner.session)
            .finish()
    }
}
