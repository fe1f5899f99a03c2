//! Guard command implementation.

use anyhow::Result;
use clap::Args;

use reelpass_core::{GuardDecision, RouteGuard};

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct GuardArgs {
    /// Route to check, e.g. /store/movies
    pub path: String,

    /// Print the decision as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(global: &GlobalArgs, args: GuardArgs) -> Result<()> {
    let session = storage::offline_session(global)?;
    let guard = RouteGuard::new(storage::routes(global)?);
    let decision = guard.evaluate(&args.path, session.guard_state());

    if args.json {
        return output::json(&decision);
    }

    match decision {
        GuardDecision::Allow => output::success(&format!("{} allowed", args.path)),
        GuardDecision::Redirect(location) => output::field("Redirect", &location),
    }
    Ok(())
}
