//! Login and renewal over HTTP.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use reelpass_core::{
    AccessToken, AuthApi, AuthConfig, Credentials, RefreshToken, Renewal, Result, TokenPair,
};

use crate::http::HttpClient;
use crate::http::endpoints::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};

/// [`AuthApi`] implementation posting JSON to the token endpoints.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: HttpClient,
    login_path: String,
    refresh_path: String,
}

impl HttpAuthApi {
    /// Create an API client using the endpoints from `config`.
    pub fn new(client: HttpClient, config: &AuthConfig) -> Self {
        Self {
            client,
            login_path: config.login_path.clone(),
            refresh_path: config.refresh_path.clone(),
        }
    }

    /// Returns the underlying HTTP client.
    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair> {
        info!("Logging in");

        let response: LoginResponse = self
            .client
            .post_json(
                &self.login_path,
                &LoginRequest {
                    username: credentials.username(),
                    password: credentials.password(),
                },
            )
            .await?;

        debug!("Login accepted");
        Ok(TokenPair {
            access: AccessToken::new(response.access),
            refresh: RefreshToken::new(response.refresh),
        })
    }

    #[instrument(skip_all)]
    async fn renew(&self, refresh: &RefreshToken) -> Result<Renewal> {
        let response: RefreshResponse = self
            .client
            .post_json(
                &self.refresh_path,
                &RefreshRequest {
                    refresh: refresh.expose_secret(),
                },
            )
            .await?;

        debug!(rotated = response.refresh.is_some(), "Renewal accepted");
        Ok(Renewal {
            access: AccessToken::new(response.access),
            refresh: response.refresh.map(RefreshToken::new),
        })
    }
}
