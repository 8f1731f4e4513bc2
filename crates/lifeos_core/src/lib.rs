//! Core domain logic for the LifeOS dashboard.
//! This crate is the single source of truth for task invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;
pub mod view;

pub use clock::{local_today, Clock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::feeds::{assistant_reply, AssistantError, AssistantReply};
pub use model::task::{
    NewTask, Task, TaskId, TaskPatch, TaskPriority, TaskStatus, TaskValidationError,
};
pub use repo::task_repo::{
    KvTaskRepository, RepoError, RepoResult, TaskRepository, TASKS_STORAGE_KEY,
};
pub use service::task_store::{
    FlushPolicy, MutationOutcome, Persistence, Rejection, StoreConfig, SubscriptionId, TaskStore,
};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteKvStorage, StorageError};
pub use view::task_views::{
    critical_due_today_count, filter_by_view, focus_lane, focus_order, open_tasks, TaskCounts,
    TaskView, FOCUS_LANE_LEN,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
