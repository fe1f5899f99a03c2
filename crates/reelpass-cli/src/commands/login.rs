//! Login command implementation.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use reelpass_core::LoginForm;
use reelpass_http::LoginOutcome;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account username
    #[arg(long, default_value = "")]
    pub username: String,

    /// Account password
    #[arg(long, env = "REELPASS_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,
}

pub async fn run(global: &GlobalArgs, args: LoginArgs) -> Result<()> {
    let (auth, store) = storage::connect(global)?;
    let form = LoginForm::new(args.username, args.password);

    eprintln!("{}", "Logging in...".dimmed());

    match auth.login(&form).await {
        LoginOutcome::Authenticated { .. } => {
            output::success("Logged in successfully");
            println!();
            output::field("API", auth.config().api_url.as_str());
            output::flag("Privileged", auth.session().is_privileged());
            output::field("Store", &store.dir().display().to_string());
            Ok(())
        }
        LoginOutcome::Invalid { errors } => {
            for (field, messages) in errors.iter() {
                for message in messages {
                    output::error(&format!("{}: {}", field, message));
                }
            }
            bail!("Invalid login form")
        }
        LoginOutcome::Rejected { message } => bail!("Login failed: {}", message),
    }
}
