//! JSON-over-HTTP client for the remote API.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use reelpass_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use reelpass_core::{AccessToken, ApiUrl};

use super::endpoints::error_message;

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    api: ApiUrl,
}

impl HttpClient {
    /// Create a client for `api` with the given transport timeout.
    pub fn new(api: ApiUrl, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reelpass/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(map_reqwest)?;

        Ok(Self { client, api })
    }

    /// Returns the API base URL this client is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// POST a JSON body without credentials and decode the JSON reply.
    ///
    /// Used by the login and renewal endpoints, which authenticate through
    /// their request bodies.
    #[instrument(skip(self, body), fields(api = %self.api))]
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.api.endpoint(path)?;
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(body)
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Send a request, with the bearer header when `token` is given, and
    /// hand back the raw response.
    ///
    /// Status handling is left to the caller so it can react to 401.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: &str,
        token: Option<&AccessToken>,
        query: &[(String, String)],
        headers: &[(String, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<Response, Error> {
        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            let bearer = HeaderValue::from_str(&token.bearer()).map_err(|e| {
                InvalidInputError::Other {
                    message: format!("access token is not a valid header value: {}", e),
                }
            })?;
            request = request.header(AUTHORIZATION, bearer);
        }

        if !query.is_empty() {
            request = request.query(query);
        }
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(map_reqwest)
    }

    async fn handle_response<R: DeserializeOwned>(&self, response: Response) -> Result<R, Error> {
        let status = response.status();
        trace!(status = %status, "response");

        if status.is_success() {
            response.json::<R>().await.map_err(map_reqwest)
        } else {
            Err(Error::Protocol(parse_error_response(response).await))
        }
    }
}

/// Turn a non-success response into a [`ProtocolError`], keeping the
/// server's message when the body carries one.
pub(crate) async fn parse_error_response(response: Response) -> ProtocolError {
    let status = response.status();
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => error_message(&body),
        Err(_) => None,
    };

    ProtocolError::new(
        status.as_u16(),
        message.or_else(|| status.canonical_reason().map(str::to_string)),
    )
}

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn map_reqwest(err: reqwest::Error) -> Error {
    let error = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let api = ApiUrl::new("https://rentals.example.com").unwrap();
        let client = HttpClient::new(api.clone(), Duration::from_secs(5)).unwrap();
        assert_eq!(client.api(), &api);
    }
}
