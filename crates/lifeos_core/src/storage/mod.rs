//! Durable key-value slots used as client-side storage.
//!
//! # Responsibility
//! - Define the minimal get/set/remove contract task persistence relies on.
//! - Provide SQLite-backed and in-process implementations.
//!
//! # Invariants
//! - `set` replaces the whole slot value or fails without a partial write.
//! - Implementations report failures; callers decide whether to swallow them.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteKvStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage failure surfaced to persistence adapters.
#[derive(Debug)]
pub enum StorageError {
    /// Storage is disabled or cannot be reached.
    Unavailable,
    /// Value does not fit the remaining capacity.
    QuotaExceeded { needed: usize, available: usize },
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage is unavailable"),
            Self::QuotaExceeded { needed, available } => write!(
                f,
                "storage quota exceeded: needed {needed} bytes, {available} available"
            ),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String-keyed durable slots.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for &S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
