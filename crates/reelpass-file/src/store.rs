//! Token files on disk.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, instrument, warn};

use reelpass_core::Result;
use reelpass_core::error::{Error, TransportError};
use reelpass_core::{AccessToken, RefreshToken, TokenStore};

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

const REFRESH_FILE: &str = "refresh";
const ACCESS_FILE: &str = "access";
const LOCK_FILE: &str = ".lock";

/// Owner read/write only.
const REFRESH_MODE: u32 = 0o600;
const ACCESS_MODE: u32 = 0o644;

fn map_io(err: io::Error) -> Error {
    Error::Transport(TransportError::Http {
        message: format!("IO error: {}", err),
    })
}

/// A [`TokenStore`] writing each credential to its own file.
///
/// Writes go through a temporary file and a rename while holding an
/// exclusive lock on `.lock`, so concurrent processes sharing a directory
/// never observe a half-written token. Storage faults are logged and the
/// affected credential reads as absent.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Open a store in `dir`, creating the directory if needed.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(map_io)?;
        debug!("Opened token store");
        Ok(Self { dir })
    }

    /// Returns the directory holding the token files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn lock(&self) -> io::Result<File> {
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.path(LOCK_FILE))?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn write(&self, name: &str, value: &str, mode: u32) -> io::Result<()> {
        let lock = self.lock()?;
        let target = self.path(name);
        let temp = self.path(&format!(".{}.tmp", name));

        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        options.mode(mode);

        let mut file = options.open(&temp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;

        // A stale temp file keeps its old mode, so set it explicitly
        #[cfg(unix)]
        fs::set_permissions(&temp, fs::Permissions::from_mode(mode))?;
        #[cfg(not(unix))]
        let _ = mode;

        fs::rename(&temp, &target)?;
        lock.unlock()
    }

    fn read(&self, name: &str) -> Option<String> {
        match fs::read_to_string(self.path(name)) {
            Ok(contents) => {
                let value = contents.trim();
                (!value.is_empty()).then(|| value.to_string())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(file = name, error = %err, "Failed to read token file");
                None
            }
        }
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        let lock = self.lock()?;
        match fs::remove_file(self.path(name)) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        lock.unlock()
    }

    fn report(&self, name: &str, action: &str, result: io::Result<()>) {
        match result {
            Ok(()) => debug!(file = name, action, "Token file updated"),
            Err(err) => warn!(file = name, action, error = %err, "Token file update failed"),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn set_refresh(&self, token: RefreshToken) {
        let result = self.write(REFRESH_FILE, token.expose_secret(), REFRESH_MODE);
        self.report(REFRESH_FILE, "write", result);
    }

    fn refresh(&self) -> Option<RefreshToken> {
        self.read(REFRESH_FILE).map(RefreshToken::new)
    }

    fn clear_refresh(&self) {
        let result = self.remove(REFRESH_FILE);
        self.report(REFRESH_FILE, "remove", result);
    }

    fn set_access(&self, token: AccessToken) {
        let result = self.write(ACCESS_FILE, token.as_str(), ACCESS_MODE);
        self.report(ACCESS_FILE, "write", result);
    }

    fn access(&self) -> Option<AccessToken> {
        self.read(ACCESS_FILE).map(AccessToken::new)
    }

    fn clear_access(&self) {
        let result = self.remove(ACCESS_FILE);
        self.report(ACCESS_FILE, "remove", result);
    }
}
