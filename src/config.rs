//! Runtime configuration: where data lives and which user scope the session
//! belongs to. Resolved once in `main` and passed down explicitly.

use std::env;
use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::error::ConfigError;

/// Overrides the data directory.
pub const HOME_ENV: &str = "SETLIST_BUILDER_HOME";
/// Overrides the session scope (the user identity keying band and cache).
pub const USER_ENV: &str = "SETLIST_BUILDER_USER";

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".setlist-builder";
const DB_FILE_NAME: &str = "setlist.sqlite";
const LOG_FILE_NAME: &str = "setlist-builder.log";
const SESSION_DIR_NAME: &str = "sessions";
const EXPORT_DIR_NAME: &str = "exports";
const DEFAULT_SCOPE: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub scope: String,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = match env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDir(HOME_ENV))?;
                base_dirs.home_dir().join(DATA_DIR_NAME)
            }
        };

        // An explicit scope is validated as given; the OS account name is
        // only a fallback and gets cleaned up instead.
        let scope = match env::var(USER_ENV) {
            Ok(value) => value,
            Err(_) => env::var("USER")
                .or_else(|_| env::var("USERNAME"))
                .map(|user| sanitize_scope(&user))
                .unwrap_or_else(|_| DEFAULT_SCOPE.to_string()),
        };

        Self::new(data_dir, &scope)
    }

    /// Validate and normalize an explicit configuration.
    pub fn new(data_dir: impl Into<PathBuf>, scope: &str) -> Result<Self, ConfigError> {
        let scope = scope.trim();
        let scope = if scope.is_empty() { DEFAULT_SCOPE } else { scope };
        if !scope.chars().all(is_scope_char) {
            return Err(ConfigError::InvalidValue(USER_ENV, scope.to_string()));
        }
        Ok(Self {
            data_dir: data_dir.into(),
            scope: scope.to_string(),
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    pub fn session_dir(&self) -> PathBuf {
        self.data_dir.join(SESSION_DIR_NAME)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join(EXPORT_DIR_NAME)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn is_scope_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '@')
}

/// Map every character a scope may not carry to `_`.
fn sanitize_scope(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|ch| if is_scope_char(ch) { ch } else { '_' })
        .collect()
}
