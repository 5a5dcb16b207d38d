//! Typed errors for the few places where callers need to tell failures apart.
//! Everything else flows through `anyhow` with context strings.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Problems resolving the runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No home directory and no explicit data directory.
    #[error("could not locate home directory; set {0}")]
    NoHomeDir(&'static str),

    /// An environment variable was set to something unusable.
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Failures while turning the setlist into a printable sheet.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("the setlist is empty")]
    EmptySetlist,

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
