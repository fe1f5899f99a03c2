//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use reelpass_core::RefreshTrigger;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(global: &GlobalArgs, _args: RefreshArgs) -> Result<()> {
    let (auth, _store) = storage::connect(global)?;

    eprintln!("{}", "Refreshing session...".dimmed());

    auth.refresher()
        .refresh(RefreshTrigger::Manual)
        .await
        .context("Failed to refresh session. Run 'reelpass login' again.")?;

    output::success("Session refreshed successfully");
    output::flag("Privileged", auth.session().is_privileged());

    Ok(())
}
