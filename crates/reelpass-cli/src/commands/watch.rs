//! Watch command implementation.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use reelpass_core::{SessionEvent, SessionSnapshot};

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between renewals (defaults to 600)
    #[arg(long)]
    pub interval: Option<u64>,
}

pub async fn run(global: &GlobalArgs, args: WatchArgs) -> Result<()> {
    let mut config = storage::config(global)?;
    if let Some(secs) = args.interval {
        config = config.refresh_interval(Duration::from_secs(secs.max(1)));
    }
    let store = storage::open_store(global)?;
    let auth = reelpass_http::Auth::new(config, store)?;

    let mut events = auth.session().events();
    let mut snapshots = auth.session().subscribe();

    let snapshot = auth.initialize().await;
    if snapshot.access_token.is_none() {
        anyhow::bail!("No active session. Run 'reelpass login' first.");
    }
    output::success("Session active; renewing in the background (Ctrl-C to stop)");

    snapshots.borrow_and_update();
    let ticker = auth.spawn_refresh_ticker();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(line) = renewal_line(&snapshots.borrow_and_update()) {
                    eprintln!("{}", line);
                }
            }
            event = events.recv() => match event {
                Ok(event) if event.requires_login() => {
                    output::error(match event {
                        SessionEvent::Expired => "Session expired. Run 'reelpass login' again.",
                        _ => "Signed out.",
                    });
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Missed session events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    ticker.abort();
    Ok(())
}

/// Progress line for a changed snapshot. A cleared session is reported
/// through the `Expired` event instead.
fn renewal_line(snapshot: &SessionSnapshot) -> Option<String> {
    snapshot.access_token.as_ref()?;
    Some(format!(
        "{} privileged={}",
        "access token renewed".dimmed(),
        snapshot.is_privileged
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelpass_core::AccessToken;

    #[test]
    fn cleared_snapshot_prints_nothing() {
        let cleared = SessionSnapshot {
            access_token: None,
            is_privileged: false,
            is_loading: false,
        };
        assert_eq!(renewal_line(&cleared), None);
    }

    #[test]
    fn renewed_snapshot_reports_privilege() {
        let renewed = SessionSnapshot {
            access_token: Some(AccessToken::new("access-1")),
            is_privileged: true,
            is_loading: false,
        };
        let line = renewal_line(&renewed).unwrap();
        assert!(line.contains("access token renewed"));
        assert!(line.ends_with("privileged=true"));
    }
}
