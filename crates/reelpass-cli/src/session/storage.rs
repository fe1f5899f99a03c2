//! Locating the credential store and building the session from it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use reelpass_core::{ApiUrl, AuthConfig, ClaimsDecoder, RouteTable, SessionContext, TokenStore};
use reelpass_file::FileTokenStore;
use reelpass_http::Auth;

use crate::cli::GlobalArgs;

/// Resolve the credential directory: `--store`, else the platform data dir.
pub fn store_dir(global: &GlobalArgs) -> Result<PathBuf> {
    if let Some(dir) = &global.store {
        return Ok(dir.clone());
    }

    let dirs =
        ProjectDirs::from("", "", "reelpass").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("tokens"))
}

/// Open the file-backed credential store.
pub fn open_store(global: &GlobalArgs) -> Result<Arc<FileTokenStore>> {
    let dir = store_dir(global)?;
    let store = FileTokenStore::open(&dir)
        .with_context(|| format!("Failed to open token store at {}", dir.display()))?;
    Ok(Arc::new(store))
}

/// The guard's route table: `--routes` when given, else the defaults.
///
/// Fields missing from the file keep their default value.
pub fn routes(global: &GlobalArgs) -> Result<RouteTable> {
    let Some(file) = &global.routes else {
        return Ok(RouteTable::default());
    };
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read route table {}", file.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid route table in {}", file.display()))
}

/// Build the session configuration from the global options.
pub fn config(global: &GlobalArgs) -> Result<AuthConfig> {
    let host = global
        .host
        .as_deref()
        .context("No API host. Pass --host or set REELPASS_HOST.")?;

    let mut config = AuthConfig::new(ApiUrl::new(host).context("Invalid API host")?)
        .rotate_refresh(global.rotate_refresh)
        .routes(routes(global)?);
    if let Some(path) = &global.login_path {
        config = config.login_path(path);
    }
    if let Some(path) = &global.refresh_path {
        config = config.refresh_path(path);
    }
    Ok(config)
}

/// Build the authenticated session over the on-disk store.
pub fn connect(global: &GlobalArgs) -> Result<(Auth, Arc<FileTokenStore>)> {
    let config = config(global)?;
    let store = open_store(global)?;
    let auth = Auth::new(config, store.clone() as Arc<dyn TokenStore>)
        .context("Failed to set up HTTP client")?;
    Ok((auth, store))
}

/// Session state over the store without any network configuration.
pub fn offline_session(global: &GlobalArgs) -> Result<SessionContext> {
    let store = open_store(global)?;
    Ok(SessionContext::new(store, ClaimsDecoder::default()))
}
