//! SQLite bootstrap backing the durable key-value slots.
//!
//! # Responsibility
//! - Open and configure SQLite connections for LifeOS core.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Storage must not be read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while preparing or using the slot database.
#[derive(Debug)]
pub enum DbError {
    /// The file (or in-memory handle) could not be opened at all.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// A statement on an open connection failed.
    Sqlite(rusqlite::Error),
    /// The file carries a schema written by a newer LifeOS build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Short machine-readable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "db_open_failed",
            Self::Sqlite(_) => "db_statement_failed",
            Self::SchemaTooNew { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "cannot open task database {target}: {source}")
            }
            Self::Sqlite(err) => write!(f, "task database error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "task database schema v{found} needs a newer lifeos (this build reads up to v{supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
