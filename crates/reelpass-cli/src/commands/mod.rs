//! Subcommand implementations.

mod guard;
mod login;
mod logout;
mod refresh;
mod request;
mod watch;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

use crate::cli::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session credentials
    Login(login::LoginArgs),

    /// Forget the stored credentials
    Logout(logout::LogoutArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Renew the access token now
    Refresh(refresh::RefreshArgs),

    /// Send an authenticated request
    Request(request::RequestArgs),

    /// Check whether navigation to a route is allowed
    Guard(guard::GuardArgs),

    /// Keep the session alive, renewing on an interval
    Watch(watch::WatchArgs),
}

pub async fn handle(global: GlobalArgs, command: Commands) -> Result<()> {
    match command {
        Commands::Login(args) => login::run(&global, args).await,
        Commands::Logout(args) => logout::run(&global, args),
        Commands::Whoami(args) => whoami::run(&global, args),
        Commands::Refresh(args) => refresh::run(&global, args).await,
        Commands::Request(args) => request::run(&global, args).await,
        Commands::Guard(args) => guard::run(&global, args),
        Commands::Watch(args) => watch::run(&global, args).await,
    }
}
