#![forbid(unsafe_code)]

//! Log setup.
//!
//! The terminal belongs to the UI, so logs only ever go to a file. With no
//! `--log-file` nothing is installed and every `tracing` call is a no-op.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "TERMFOLIO_LOG";

/// Filter used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Build the filter from [`LOG_ENV`], falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to `path`.
///
/// Returns `Ok(false)` if a subscriber was already installed.
pub fn init(path: &Path, json: bool) -> Result<bool> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    let installed = if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    if installed {
        tracing::info!(path = %path.display(), json, "logging initialised");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unopenable_path_is_reported() {
        let dir = std::env::temp_dir().join("termfolio-missing-dir-for-test");
        let path = dir.join("nested").join("log.txt");
        match init(&path, false) {
            Err(Error::LogFile { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected log file error, got {other:?}"),
        }
    }

    #[test]
    fn default_filter_parses() {
        assert_eq!(EnvFilter::new(DEFAULT_FILTER).to_string(), "warn");
    }
}
