//! SQLite document store bootstrap.
//!
//! # Responsibility
//! - Resolve connection strings into file or in-memory store targets.
//! - Open and configure connections, then lay out the `people` table.
//!
//! # Invariants
//! - Layout version is tracked via `PRAGMA user_version`.
//! - No document is read or written before the layout is applied.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_target};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    InvalidDatabaseUrl(String),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidDatabaseUrl(url) => write!(f, "invalid database url `{url}`"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidDatabaseUrl(_) => None,
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Where a store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    File(PathBuf),
    Memory,
}

impl DatabaseTarget {
    /// Parses a connection string.
    ///
    /// Accepted forms: `sqlite::memory:`, `:memory:`, `sqlite://<path>`,
    /// `sqlite:<path>`, or a bare filesystem path.
    pub fn parse(url: &str) -> DbResult<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(DbError::InvalidDatabaseUrl(url.to_string()));
        }

        if matches!(trimmed, ":memory:" | "sqlite::memory:" | "sqlite://:memory:") {
            return Ok(Self::Memory);
        }

        let path = if let Some(rest) = trimmed.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("sqlite:") {
            rest
        } else if trimmed.contains("://") {
            return Err(DbError::InvalidDatabaseUrl(url.to_string()));
        } else {
            trimmed
        };

        if path.is_empty() {
            return Err(DbError::InvalidDatabaseUrl(url.to_string()));
        }

        Ok(Self::File(PathBuf::from(path)))
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DatabaseTarget, DbError};
    use std::path::PathBuf;

    #[test]
    fn parse_recognizes_memory_forms() {
        for url in [":memory:", "sqlite::memory:", " sqlite://:memory: "] {
            assert_eq!(DatabaseTarget::parse(url).unwrap(), DatabaseTarget::Memory);
        }
    }

    #[test]
    fn parse_strips_sqlite_scheme() {
        assert_eq!(
            DatabaseTarget::parse("sqlite:///var/lib/people.db").unwrap(),
            DatabaseTarget::File(PathBuf::from("/var/lib/people.db"))
        );
        assert_eq!(
            DatabaseTarget::parse("sqlite:people.db").unwrap(),
            DatabaseTarget::File(PathBuf::from("people.db"))
        );
        assert_eq!(
            DatabaseTarget::parse("data/people.db").unwrap(),
            DatabaseTarget::File(PathBuf::from("data/people.db"))
        );
    }

    #[test]
    fn parse_rejects_foreign_schemes_and_blank_input() {
        for url in ["", "   ", "mongodb://localhost/people", "sqlite://"] {
            assert!(matches!(
                DatabaseTarget::parse(url),
                Err(DbError::InvalidDatabaseUrl(_))
            ));
        }
    }
}
