#![forbid(unsafe_code)]

//! Errors surfaced by the binary.

use std::fmt;
use std::io;
use std::path::PathBuf;

use termfolio_core::ConfigError;

#[derive(Debug)]
pub enum Error {
    /// Terminal setup, polling, or output failed.
    Io(io::Error),
    /// A setting from the command line or environment was rejected.
    Config(ConfigError),
    /// The log file could not be opened.
    LogFile { path: PathBuf, source: io::Error },
    /// Unrecognised command-line argument.
    UnknownArgument(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "terminal I/O failed: {err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::LogFile { path, source } => {
                write!(f, "cannot open log file {}: {source}", path.display())
            }
            Self::UnknownArgument(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) | Self::LogFile { source: err, .. } => Some(err),
            Self::Config(err) => Some(err),
            Self::UnknownArgument(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
