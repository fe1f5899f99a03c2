//! Whoami command implementation.

use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the session as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct SessionInfo {
    signed_in: bool,
    is_privileged: bool,
    access_expires_at: Option<String>,
    access_expired: Option<bool>,
}

pub fn run(global: &GlobalArgs, args: WhoamiArgs) -> Result<()> {
    let session = storage::offline_session(global)?;

    let claims = session
        .access_token()
        .map(|token| session.decoder().decode(token.as_str()))
        .filter(|claims| claims.has_expiry());

    let info = SessionInfo {
        signed_in: session.has_refresh_credential(),
        is_privileged: session.is_privileged(),
        access_expires_at: claims.map(|c| c.expires_at.to_rfc3339()),
        access_expired: claims.map(|c| c.is_expired()),
    };

    if args.json {
        return output::json_pretty(&info);
    }

    if !info.signed_in {
        bail!("No active session. Run 'reelpass login' first.");
    }

    output::flag("Signed in", info.signed_in);
    output::flag("Privileged", info.is_privileged);
    if let Some(expires_at) = &info.access_expires_at {
        output::field("Access expires", expires_at);
    }
    if info.access_expired == Some(true) {
        output::field("Note", "access token expired; it is renewed on the next request");
    }

    Ok(())
}
