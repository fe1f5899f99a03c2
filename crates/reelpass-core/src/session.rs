//! Observable session state.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::claims::ClaimsDecoder;
use crate::guard::GuardState;
use crate::tokens::{AccessToken, RefreshToken};
use crate::traits::TokenStore;

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 16;

/// Point-in-time view of the session, as consumed by UI collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The current access credential.
    pub access_token: Option<AccessToken>,
    /// Privilege flag decoded from `access_token`.
    pub is_privileged: bool,
    /// True until the startup refresh attempt has settled.
    pub is_loading: bool,
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login stored fresh credentials.
    SignedIn,
    /// The user logged out.
    SignedOut,
    /// Renewal failed; the user must log in again.
    Expired,
}

impl SessionEvent {
    /// Whether collaborators should navigate to the login view.
    pub fn requires_login(&self) -> bool {
        matches!(self, SessionEvent::SignedOut | SessionEvent::Expired)
    }
}

/// Shared handle to the session's credentials and derived state.
///
/// The token store stays the source of truth; the context recomputes the
/// derived snapshot on every access credential change and publishes it to
/// subscribers. Clones share the same state.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    store: Arc<dyn TokenStore>,
    decoder: ClaimsDecoder,
    state: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
    /// Create a context over `store`. The snapshot starts in the loading
    /// state until [`finish_loading`](Self::finish_loading) is called.
    pub fn new(store: Arc<dyn TokenStore>, decoder: ClaimsDecoder) -> Self {
        let access_token = store.access();
        let is_privileged = access_token
            .as_ref()
            .is_some_and(|t| decoder.decode(t.as_str()).is_privileged);

        let (state, _) = watch::channel(SessionSnapshot {
            access_token,
            is_privileged,
            is_loading: true,
        });
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(ContextInner {
                store,
                decoder,
                state,
                events,
            }),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Subscribe to lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Returns the stored access credential.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.inner.store.access()
    }

    /// Returns the privilege flag of the current access credential.
    pub fn is_privileged(&self) -> bool {
        self.inner.state.borrow().is_privileged
    }

    /// Whether the startup refresh is still pending.
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    /// Whether a refresh credential is stored. The credential itself is
    /// not available through the context.
    pub fn has_refresh_credential(&self) -> bool {
        self.inner.store.has_refresh()
    }

    /// Returns the decoder used for the privilege flag.
    pub fn decoder(&self) -> &ClaimsDecoder {
        &self.inner.decoder
    }

    /// Facts for the navigation guard, read from the store.
    pub fn guard_state(&self) -> GuardState {
        let is_privileged = self
            .inner
            .store
            .access()
            .is_some_and(|t| self.inner.decoder.decode(t.as_str()).is_privileged);

        GuardState {
            has_refresh: self.inner.store.has_refresh(),
            is_privileged,
        }
    }

    /// Replace or remove the access credential.
    ///
    /// The privilege flag is recomputed from the new token before the
    /// snapshot is published, so observers never see a stale pairing.
    pub fn set_access(&self, token: Option<AccessToken>) {
        match &token {
            Some(token) => self.inner.store.set_access(token.clone()),
            None => self.inner.store.clear_access(),
        }

        let is_privileged = token
            .as_ref()
            .is_some_and(|t| self.inner.decoder.decode(t.as_str()).is_privileged);

        debug!(is_privileged, present = token.is_some(), "Access credential updated");

        self.inner.state.send_modify(|snapshot| {
            snapshot.access_token = token;
            snapshot.is_privileged = is_privileged;
        });
    }

    /// Mark the startup refresh as settled and release [`ready`](Self::ready).
    pub fn finish_loading(&self) {
        self.inner.state.send_if_modified(|snapshot| {
            let changed = snapshot.is_loading;
            snapshot.is_loading = false;
            changed
        });
    }

    /// Wait until the startup refresh has settled, then return the snapshot.
    ///
    /// Protected content should be withheld until this resolves.
    pub async fn ready(&self) -> SessionSnapshot {
        let mut rx = self.inner.state.subscribe();
        match rx.wait_for(|snapshot| !snapshot.is_loading).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        }
    }

    pub(crate) fn refresh_token(&self) -> Option<RefreshToken> {
        self.inner.store.refresh()
    }

    pub(crate) fn set_refresh(&self, token: RefreshToken) {
        self.inner.store.set_refresh(token);
    }

    /// Remove both credentials and publish the empty snapshot.
    pub(crate) fn clear(&self) {
        self.inner.store.clear_refresh();
        self.set_access(None);
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No subscribers is fine: nobody is listening for navigation.
        let _ = self.inner.events.send(event);
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("SessionContext")
            .field("is_privileged", &snapshot.is_privileged)
            .field("is_loading", &snapshot.is_loading)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
