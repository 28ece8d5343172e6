//! Log setup
//!
//! The terminal belongs to the UI, so logs go to a file. The filter comes
//! from `LETTERDROP_LOG` (tracing `EnvFilter` syntax), defaulting to `info`.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LETTERDROP_LOG";
const DEFAULT_FILTER: &str = "info";

/// `letterdrop.log` inside the OS-standard data directory.
pub fn default_log_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", crate::config::APP_NAME)
        .map(|dirs| dirs.data_dir().join("letterdrop.log"))
}

/// Install the global subscriber, appending to `path`.
pub fn init(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file: File = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))
}
