//! reelpass-http - HTTP transport for the reelpass session layer.
//!
//! Provides [`HttpAuthApi`] for the login and renewal endpoints, the
//! [`ResilientClient`] that renews once and retries on 401, and the [`Auth`]
//! facade tying them to a [`reelpass_core::SessionContext`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reelpass_core::{ApiUrl, AuthConfig, LoginForm, MemoryTokenStore};
//! use reelpass_http::{Auth, LoginOutcome, RequestOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::new(ApiUrl::new("https://rentals.example.com")?);
//! let auth = Auth::new(config, Arc::new(MemoryTokenStore::new()))?;
//! auth.initialize().await;
//!
//! if let LoginOutcome::Authenticated { .. } = auth.login(&LoginForm::new("alice", "pw")).await {
//!     let movies = auth.request("/api/movies/", &RequestOptions::get()).await?;
//!     println!("{}", movies);
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod auth;
mod http;
mod request;

pub use api::HttpAuthApi;
pub use auth::{Auth, LoginOutcome};
pub use http::HttpClient;
pub use reqwest::Method;
pub use request::{NETWORK_ERROR, RequestError, RequestOptions, ResilientClient, UNAUTHORIZED};
