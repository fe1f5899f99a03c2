//! reelpass-core - Session state and credential renewal primitives.
//!
//! This crate holds everything about an authenticated API session that does
//! not depend on a particular transport: credential types and storage,
//! unverified claim decoding, the observable [`SessionContext`], the
//! single-flight [`SessionRefresher`] and the navigation [`RouteGuard`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use reelpass_core::{ClaimsDecoder, GuardDecision, MemoryTokenStore, RouteGuard, SessionContext};
//!
//! let store = Arc::new(MemoryTokenStore::new());
//! let session = SessionContext::new(store, ClaimsDecoder::default());
//!
//! let guard = RouteGuard::default();
//! assert_eq!(
//!     guard.evaluate("/store/movies", session.guard_state()),
//!     GuardDecision::Redirect("/login".to_string()),
//! );
//! ```

pub mod claims;
pub mod config;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod refresh;
pub mod session;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

pub use claims::{Claims, ClaimsDecoder};
pub use config::AuthConfig;
pub use credentials::{Credentials, LoginForm};
pub use error::{AuthError, Error, FieldErrors};
pub use guard::{GuardDecision, GuardState, RouteGuard, RouteTable};
pub use refresh::{RefreshHandle, RefreshResult, RefreshState, RefreshTrigger, SessionRefresher};
pub use session::{SessionContext, SessionEvent, SessionSnapshot};
pub use store::MemoryTokenStore;
pub use tokens::{AccessToken, RefreshToken, Renewal, TokenPair};
pub use traits::{AuthApi, TokenStore};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
