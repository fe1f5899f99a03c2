//! reelpass-file - Filesystem-backed credential storage.
//!
//! [`FileTokenStore`] keeps the refresh credential in an owner-only file
//! and the access credential in a world-readable one, so a session
//! survives process restarts.

mod store;

pub use store::FileTokenStore;
