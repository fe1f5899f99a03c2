//! In-memory token store.

use std::sync::{PoisonError, RwLock};

use crate::tokens::{AccessToken, RefreshToken};
use crate::traits::TokenStore;

/// A [`TokenStore`] that keeps credentials in process memory.
///
/// Nothing survives a restart; use it for tests and for embedders that
/// persist credentials themselves.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredTokens>,
}

#[derive(Debug, Default)]
struct StoredTokens {
    access: Option<AccessToken>,
    refresh: Option<RefreshToken>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with credentials.
    pub fn with_tokens(access: Option<AccessToken>, refresh: Option<RefreshToken>) -> Self {
        Self {
            tokens: RwLock::new(StoredTokens { access, refresh }),
        }
    }

    fn write(&self, f: impl FnOnce(&mut StoredTokens)) {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut tokens);
    }

    fn read<T>(&self, f: impl FnOnce(&StoredTokens) -> T) -> T {
        let tokens = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
        f(&tokens)
    }
}

impl TokenStore for MemoryTokenStore {
    fn set_refresh(&self, token: RefreshToken) {
        self.write(|t| t.refresh = Some(token));
    }

    fn refresh(&self) -> Option<RefreshToken> {
        self.read(|t| t.refresh.clone())
    }

    fn clear_refresh(&self) {
        self.write(|t| t.refresh = None);
    }

    fn set_access(&self, token: AccessToken) {
        self.write(|t| t.access = Some(token));
    }

    fn access(&self) -> Option<AccessToken> {
        self.read(|t| t.access.clone())
    }

    fn clear_access(&self) {
        self.write(|t| t.access = None);
    }
}
