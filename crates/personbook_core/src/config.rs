//! Environment-provided configuration.
//!
//! # Responsibility
//! - Read the store connection string and logging options once at startup.
//! - Load a `.env` file when present.
//!
//! # Invariants
//! - Values are validated here; later stages never re-read the environment.

use crate::db::{DatabaseTarget, DbResult};
use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LogTarget};
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DATABASE_URL_VAR: &str = "PERSONBOOK_DATABASE_URL";
pub const FALLBACK_DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const LOG_LEVEL_VAR: &str = "PERSONBOOK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "PERSONBOOK_LOG_DIR";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:personbook.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{LOG_LEVEL_VAR}: {message}"),
            Self::RelativeLogDir(message) => write!(f, "{LOG_DIR_VAR}: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub log_level: &'static str,
    pub log_target: LogTarget,
}

impl Config {
    /// Reads configuration from the process environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = non_blank(DATABASE_URL_VAR)
            .or_else(|| non_blank(FALLBACK_DATABASE_URL_VAR))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let log_level = match non_blank(LOG_LEVEL_VAR) {
            Some(level) => normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let log_target = match non_blank(LOG_DIR_VAR) {
            Some(dir) => LogTarget::Directory(
                normalize_log_dir(&dir).map_err(ConfigError::RelativeLogDir)?,
            ),
            None => LogTarget::Stderr,
        };

        Ok(Self {
            database_url,
            log_level,
            log_target,
        })
    }

    /// Resolves the configured connection string.
    pub fn database_target(&self) -> DbResult<DatabaseTarget> {
        DatabaseTarget::parse(&self.database_url)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError, DEFAULT_DATABASE_URL};
    use crate::db::DatabaseTarget;
    use crate::logging::{default_log_level, LogTarget};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_target, LogTarget::Stderr);
    }

    #[test]
    fn prefixed_url_wins_over_fallback() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite:other.db"),
            ("PERSONBOOK_DATABASE_URL", "sqlite::memory:"),
        ])
        .unwrap();
        assert_eq!(config.database_target().unwrap(), DatabaseTarget::Memory);

        let fallback = config_from(&[("DATABASE_URL", "sqlite:other.db")]).unwrap();
        assert_eq!(
            fallback.database_target().unwrap(),
            DatabaseTarget::File(PathBuf::from("other.db"))
        );
    }

    #[test]
    fn log_options_are_validated() {
        let config = config_from(&[
            ("PERSONBOOK_LOG_LEVEL", "WARNING"),
            ("PERSONBOOK_LOG_DIR", "/var/log/personbook"),
        ])
        .unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.log_target,
            LogTarget::Directory(PathBuf::from("/var/log/personbook"))
        );

        assert!(matches!(
            config_from(&[("PERSONBOOK_LOG_LEVEL", "loud")]),
            Err(ConfigError::InvalidLogLevel(_))
        ));
        assert!(matches!(
            config_from(&[("PERSONBOOK_LOG_DIR", "relative/logs")]),
            Err(ConfigError::RelativeLogDir(_))
        ));
    }
}
