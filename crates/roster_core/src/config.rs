//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe where the user table lives and how connections are tuned.
//! - Carry optional logging settings for hosts that bootstrap logging from config.
//!
//! # Invariants
//! - Missing fields fall back to defaults; unknown fields are rejected.
//! - `db_path = None` selects an in-memory database.

use crate::db::DEFAULT_BUSY_TIMEOUT;
use crate::logging::{default_log_level, init_logging};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest busy timeout SQLite can represent.
pub const MAX_BUSY_TIMEOUT_MS: u64 = i32::MAX as u64;

/// Errors raised while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    /// `busy_timeout_ms` above what SQLite accepts (`i32::MAX`).
    InvalidBusyTimeout(u64),
    Logging(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid roster config: {err}"),
            Self::InvalidBusyTimeout(value) => write!(
                f,
                "busy_timeout_ms ({value}) must be <= {MAX_BUSY_TIMEOUT_MS}"
            ),
            Self::Logging(message) => write!(f, "logging bootstrap failed: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::InvalidBusyTimeout(_) => None,
            Self::Logging(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Store and logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    /// Database file. `None` keeps data in memory.
    pub db_path: Option<PathBuf>,
    /// How long a writer waits on a locked database file.
    pub busy_timeout_ms: u64,
    /// Log level; defaults to [`default_log_level`] when logging is enabled.
    pub log_level: Option<String>,
    /// Absolute log directory. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
            log_level: None,
            log_dir: None,
        }
    }
}

impl RosterConfig {
    /// Default settings with a file-backed database.
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.busy_timeout()?;
        Ok(config)
    }

    /// Busy timeout as a `Duration`.
    ///
    /// # Errors
    /// - `busy_timeout_ms` exceeds [`MAX_BUSY_TIMEOUT_MS`].
    pub fn busy_timeout(&self) -> Result<Duration, ConfigError> {
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::InvalidBusyTimeout(self.busy_timeout_ms));
        }
        Ok(Duration::from_millis(self.busy_timeout_ms))
    }

    /// Returns whether the database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.db_path.is_none()
    }

    /// Starts file logging when `log_dir` is configured.
    ///
    /// Returns `Ok(false)` without side effects when no directory is set.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        let level = self.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &path_to_string(log_dir)).map_err(ConfigError::Logging)?;
        Ok(true)
    }
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RosterConfig};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn empty_document_uses_defaults() {
        let config = RosterConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config, RosterConfig::default());
        assert!(config.is_in_memory());
        assert_eq!(config.busy_timeout().unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn fields_are_read_from_json() {
        let config = RosterConfig::from_json_str(
            r#"{"db_path": "/tmp/roster.sqlite3", "busy_timeout_ms": 250, "log_level": "warn"}"#,
        )
        .expect("config should parse");
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/roster.sqlite3")));
        assert_eq!(config.busy_timeout().unwrap(), Duration::from_millis(250));
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert!(!config.is_in_memory());
    }

    #[test]
    fn oversized_busy_timeout_is_rejected() {
        let err = RosterConfig::from_json_str(r#"{"busy_timeout_ms": 3000000000}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBusyTimeout(3_000_000_000)));

        let at_limit = RosterConfig::from_json_str(r#"{"busy_timeout_ms": 2147483647}"#)
            .expect("i32::MAX ms should be accepted");
        assert_eq!(
            at_limit.busy_timeout().unwrap(),
            Duration::from_millis(2_147_483_647)
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = RosterConfig::from_json_str(r#"{"dbpath": "typo"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn init_logging_is_skipped_without_log_dir() {
        let config = RosterConfig::default();
        assert!(!config.init_logging().expect("no-op should succeed"));
    }
}
