//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use reelpass_core::TokenStore;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(global: &GlobalArgs, _args: LogoutArgs) -> Result<()> {
    // Logging out needs no server, so work on the store directly when no
    // host is configured.
    if global.host.is_some() {
        let (auth, _store) = storage::connect(global)?;
        auth.logout();
    } else {
        storage::open_store(global)?.clear();
    }

    output::success("Logged out");
    Ok(())
}
