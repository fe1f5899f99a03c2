//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::Commands;

/// Log in to a token-authenticated API and call it.
#[derive(Parser, Debug)]
#[command(name = "reelpass")]
#[command(author, version = env!("REELPASS_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// API base URL
    #[arg(long, env = "REELPASS_HOST", global = true)]
    pub host: Option<String>,

    /// Directory holding the stored credentials
    #[arg(long, env = "REELPASS_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Login endpoint path
    #[arg(long, env = "REELPASS_ENDPOINT_LOGIN", global = true)]
    pub login_path: Option<String>,

    /// Renewal endpoint path
    #[arg(long, env = "REELPASS_ENDPOINT_REFRESH", global = true)]
    pub refresh_path: Option<String>,

    /// JSON file overriding the guard's route table
    #[arg(long, env = "REELPASS_ROUTES", global = true)]
    pub routes: Option<PathBuf>,

    /// Keep the refresh credential the server rotates in on renewal
    #[arg(long, env = "REELPASS_ROTATE_REFRESH", global = true)]
    pub rotate_refresh: bool,
}
