//! Credential storage trait.

use crate::tokens::{AccessToken, RefreshToken};

/// Persistent storage for the session's two credentials.
///
/// The refresh credential lives in restricted-visibility storage; the
/// access credential stays readable by application code. Operations are
/// synchronous overwrites and never fail from the caller's point of view:
/// backends log storage faults and report the value as absent.
pub trait TokenStore: Send + Sync {
    /// Store the refresh credential.
    fn set_refresh(&self, token: RefreshToken);

    /// Returns the stored refresh credential, if any.
    fn refresh(&self) -> Option<RefreshToken>;

    /// Remove the refresh credential.
    fn clear_refresh(&self);

    /// Store the access credential.
    fn set_access(&self, token: AccessToken);

    /// Returns the stored access credential, if any.
    fn access(&self) -> Option<AccessToken>;

    /// Remove the access credential.
    fn clear_access(&self);

    /// Whether a refresh credential is present.
    fn has_refresh(&self) -> bool {
        self.refresh().is_some()
    }

    /// Remove both credentials.
    fn clear(&self) {
        self.clear_refresh();
        self.clear_access();
    }
}
