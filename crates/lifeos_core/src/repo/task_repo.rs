//! Task collection repository over one key-value slot.
//!
//! # Responsibility
//! - Load the whole collection from storage, tolerating any stored shape.
//! - Save the whole collection as one canonical JSON array.
//!
//! # Invariants
//! - `load` never returns an error; doubtful data yields an empty list.
//! - `save` writes the full snapshot in a single `set` call.

use crate::clock::now_epoch_ms;
use crate::model::task::Task;
use crate::repo::legacy::decode_tasks;
use crate::storage::{KeyValueStorage, StorageError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default storage slot for the task collection.
pub const TASKS_STORAGE_KEY: &str = "lifeos.tasks.v1";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    Encode(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode tasks: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Durable round-trip of the task collection.
pub trait TaskRepository {
    /// Returns the stored collection, or an empty one on any doubt.
    fn load(&self) -> Vec<Task>;
    /// Replaces the stored collection with `tasks`.
    fn save(&self, tasks: &[Task]) -> RepoResult<()>;
}

/// `TaskRepository` backed by a `KeyValueStorage` slot.
pub struct KvTaskRepository<S: KeyValueStorage> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> KvTaskRepository<S> {
    /// Uses `TASKS_STORAGE_KEY`.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, TASKS_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Loads the collection, surfacing storage and decoding failures.
    pub fn try_load(&self) -> RepoResult<Vec<Task>> {
        match self.storage.get(&self.key)? {
            Some(raw) => decode_tasks(&raw, now_epoch_ms()),
            None => Ok(Vec::new()),
        }
    }
}

impl<S: KeyValueStorage> TaskRepository for KvTaskRepository<S> {
    fn load(&self) -> Vec<Task> {
        match self.try_load() {
            Ok(tasks) => {
                info!(
                    "event=task_load module=repo status=ok key={} count={}",
                    self.key,
                    tasks.len()
                );
                tasks
            }
            Err(err) => {
                warn!(
                    "event=task_load module=repo status=discarded key={} error={}",
                    self.key, err
                );
                Vec::new()
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> RepoResult<()> {
        let encoded = serde_json::to_string(tasks)?;
        self.storage.set(&self.key, &encoded)?;
        Ok(())
    }
}
