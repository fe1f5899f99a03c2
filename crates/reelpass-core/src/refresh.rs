//! Single-flight access token renewal.
//!
//! Every path that wants a fresh access token (the background tick, the
//! expiry check, a request that just got a 401) goes through
//! [`SessionRefresher::trigger`]. While a renewal is in flight, further
//! triggers receive a clone of the same [`RefreshHandle`], so one network
//! call serves every waiter.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{AuthError, Error};
use crate::session::{SessionContext, SessionEvent};
use crate::tokens::{AccessToken, RefreshToken, TokenPair};
use crate::traits::AuthApi;

/// Outcome delivered to every caller waiting on a renewal.
pub type RefreshResult = Result<AccessToken, AuthError>;

/// Shared handle to a renewal. Clones resolve to the same outcome.
pub type RefreshHandle = Shared<BoxFuture<'static, RefreshResult>>;

/// Refresher state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No renewal in flight.
    Idle,
    /// A renewal call is outstanding.
    Refreshing,
    /// Renewal failed or the user logged out; only a login leaves this state.
    LoggedOut,
}

/// What asked for a renewal. Used for logging only: every reason shares
/// the same single-flight path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// Session initialization.
    Startup,
    /// Fixed-interval background tick.
    Interval,
    /// The current access token's expiry has passed.
    Expired,
    /// A protected endpoint answered 401.
    Unauthorized,
    /// Explicit request from a collaborator.
    Manual,
}

impl fmt::Display for RefreshTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshTrigger::Startup => "startup",
            RefreshTrigger::Interval => "interval",
            RefreshTrigger::Expired => "expired",
            RefreshTrigger::Unauthorized => "unauthorized",
            RefreshTrigger::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// Renews the access credential from the refresh credential.
///
/// Cheap to clone; clones share the in-flight renewal and state.
#[derive(Clone)]
pub struct SessionRefresher {
    inner: Arc<RefresherInner>,
}

struct RefresherInner {
    api: Arc<dyn AuthApi>,
    session: SessionContext,
    rotate_refresh: bool,
    flight: Mutex<Flight>,
}

struct Flight {
    state: RefreshState,
    pending: Option<RefreshHandle>,
    /// Bumped by login and logout so a renewal that started under an older
    /// session cannot write its result.
    epoch: u64,
}

impl SessionRefresher {
    /// Create a refresher renewing through `api` and writing into `session`.
    pub fn new(api: Arc<dyn AuthApi>, session: SessionContext, rotate_refresh: bool) -> Self {
        Self {
            inner: Arc::new(RefresherInner {
                api,
                session,
                rotate_refresh,
                flight: Mutex::new(Flight {
                    state: RefreshState::Idle,
                    pending: None,
                    epoch: 0,
                }),
            }),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> RefreshState {
        self.flight().state
    }

    /// Returns the session this refresher writes into.
    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    /// Start a renewal, or join the one already in flight.
    ///
    /// Resolves immediately, without a network call, when the session is
    /// logged out or holds no refresh credential. The renewal runs as its
    /// own task, so it settles even if every waiter is dropped.
    pub fn trigger(&self, reason: RefreshTrigger) -> RefreshHandle {
        let mut flight = self.flight();

        if let Some(pending) = &flight.pending {
            debug!(%reason, "Joining in-flight refresh");
            return pending.clone();
        }

        if flight.state == RefreshState::LoggedOut {
            debug!(%reason, "Refresh skipped: logged out");
            return settled(Err(AuthError::LoggedOut));
        }

        let Some(refresh) = self.inner.session.refresh_token() else {
            info!(%reason, "No refresh credential, ending session");
            flight.state = RefreshState::LoggedOut;
            flight.epoch += 1;
            self.inner.session.clear();
            drop(flight);
            self.inner.session.emit(SessionEvent::Expired);
            return settled(Err(AuthError::NoRefreshCredential));
        };

        info!(%reason, "Starting refresh");
        flight.state = RefreshState::Refreshing;

        let epoch = flight.epoch;
        let this = self.clone();
        let task = tokio::spawn(async move { this.renew(refresh, epoch).await });

        let handle = async move {
            task.await.unwrap_or_else(|err| {
                Err(AuthError::RefreshUnavailable {
                    message: err.to_string(),
                })
            })
        }
        .boxed()
        .shared();

        flight.pending = Some(handle.clone());
        handle
    }

    /// Trigger a renewal and wait for its outcome.
    pub async fn refresh(&self, reason: RefreshTrigger) -> RefreshResult {
        self.trigger(reason).await
    }

    /// Renew only if the stored access token is missing or expired.
    ///
    /// Returns the token that is current afterwards.
    pub async fn refresh_if_expired(&self) -> RefreshResult {
        match self.inner.session.access_token() {
            Some(token) if !self.inner.session.decoder().decode(token.as_str()).is_expired() => {
                Ok(token)
            }
            _ => self.refresh(RefreshTrigger::Expired).await,
        }
    }

    /// Spawn the fixed-interval background trigger.
    ///
    /// The first tick fires one full `period` after spawning. The task runs
    /// until its handle is aborted; ticks while logged out are no-ops.
    pub fn spawn_ticker(&self, period: Duration) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match this.refresh(RefreshTrigger::Interval).await {
                    Ok(_) => debug!("Interval refresh succeeded"),
                    Err(AuthError::LoggedOut) => trace!("Interval refresh skipped while logged out"),
                    Err(err) => warn!(error = %err, "Interval refresh failed"),
                }
            }
        })
    }

    /// Install credentials from a successful login and leave `LoggedOut`.
    pub fn begin_session(&self, pair: TokenPair) {
        let mut flight = self.flight();
        flight.epoch += 1;
        flight.pending = None;
        flight.state = RefreshState::Idle;

        self.inner.session.set_refresh(pair.refresh);
        self.inner.session.set_access(Some(pair.access));
        drop(flight);

        info!("Session started");
        self.inner.session.emit(SessionEvent::SignedIn);
    }

    /// Clear both credentials and enter `LoggedOut`.
    ///
    /// A renewal still in flight settles as [`AuthError::Superseded`]
    /// without touching the store.
    pub fn end_session(&self) {
        let mut flight = self.flight();
        flight.epoch += 1;
        flight.pending = None;
        flight.state = RefreshState::LoggedOut;

        self.inner.session.clear();
        drop(flight);

        info!("Session ended");
        self.inner.session.emit(SessionEvent::SignedOut);
    }

    #[instrument(skip(self, refresh))]
    async fn renew(self, refresh: RefreshToken, epoch: u64) -> RefreshResult {
        let result = self.inner.api.renew(&refresh).await;

        let mut flight = self.flight();
        if flight.epoch != epoch {
            debug!("Discarding refresh result from a previous session");
            return Err(AuthError::Superseded);
        }
        flight.pending = None;

        match result {
            Ok(renewal) => {
                flight.state = RefreshState::Idle;
                if self.inner.rotate_refresh
                    && let Some(rotated) = renewal.refresh
                {
                    self.inner.session.set_refresh(rotated);
                }
                self.inner.session.set_access(Some(renewal.access.clone()));
                drop(flight);

                debug!("Refresh succeeded");
                Ok(renewal.access)
            }
            Err(err) => {
                flight.state = RefreshState::LoggedOut;
                flight.epoch += 1;
                self.inner.session.clear();
                drop(flight);

                let err = classify(err);
                warn!(error = %err, "Refresh failed, session ended");
                self.inner.session.emit(SessionEvent::Expired);
                Err(err)
            }
        }
    }

    fn flight(&self) -> MutexGuard<'_, Flight> {
        self.inner
            .flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionRefresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRefresher")
            .field("state", &self.state())
            .field("rotate_refresh", &self.inner.rotate_refresh)
            .finish()
    }
}

fn settled(result: RefreshResult) -> RefreshHandle {
    futures_util::future::ready(result).boxed().shared()
}

/// Map a renewal failure onto the session-ending auth errors.
fn classify(err: Error) -> AuthError {
    match err {
        Error::Auth(auth) => auth,
        Error::Protocol(protocol) => AuthError::RefreshRejected {
            status: protocol.status,
        },
        other => AuthError::RefreshUnavailable {
            message: other.to_string(),
        },
    }
}
