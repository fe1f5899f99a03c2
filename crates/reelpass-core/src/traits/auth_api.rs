//! Remote authorization server trait.

use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::tokens::{RefreshToken, Renewal, TokenPair};
use crate::Result;

/// The remote endpoints that issue and renew credentials.
///
/// Implementations only perform the exchange; persisting the result and
/// tracking session state is the caller's job.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange validated credentials for an access/refresh pair.
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair>;

    /// Exchange a refresh credential for a new access credential.
    async fn renew(&self, refresh: &RefreshToken) -> Result<Renewal>;
}
