//! Task store: sole owner and mutator of the task collection.
//!
//! # Responsibility
//! - Apply add/toggle/remove/update/clear mutations to in-memory state.
//! - Persist the full snapshot through a `TaskRepository`.
//! - Notify registered subscribers after every applied mutation.
//!
//! # Invariants
//! - Ids are unique within the collection for its lifetime.
//! - A rejected mutation leaves state untouched, does not persist and does
//!   not notify.
//! - Persistence failure never undoes an in-memory change; memory stays
//!   authoritative and the snapshot is retried on the next flush.
//! - New tasks are inserted at the front; display order is a view concern.

use crate::clock::{Clock, SystemClock};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};
use crate::repo::task_repo::TaskRepository;
use log::{debug, warn};
use std::fmt::{Display, Formatter};

/// When applied mutations reach the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Save after every applied mutation.
    #[default]
    Immediate,
    /// Mark dirty; save on `flush()` or drop.
    Deferred,
}

/// Store construction options.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub flush_policy: FlushPolicy,
}

/// Durability state of an applied mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Saved,
    /// Waiting for `flush()` under `FlushPolicy::Deferred`.
    Pending,
    /// Storage rejected the write; memory still holds the change.
    Failed,
}

/// Why a mutation was a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmptyTitle,
    UnknownTask(TaskId),
    EmptyPatch,
    NothingToClear,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is empty"),
            Self::UnknownTask(id) => write!(f, "task not found: {id}"),
            Self::EmptyPatch => write!(f, "update has no fields"),
            Self::NothingToClear => write!(f, "no done tasks"),
        }
    }
}

/// Result of a store mutation. Never an error: callers may ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome<T> {
    Applied { value: T, persistence: Persistence },
    Rejected(Rejection),
}

impl<T> MutationOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Applied { value, .. } => Some(value),
            Self::Rejected(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Applied { value, .. } => Some(value),
            Self::Rejected(_) => None,
        }
    }

    pub fn persistence(&self) -> Option<Persistence> {
        match self {
            Self::Applied { persistence, .. } => Some(*persistence),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Applied { .. } => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[Task])>;

/// In-memory task collection with persistence and change notification.
pub struct TaskStore<R: TaskRepository> {
    tasks: Vec<Task>,
    repo: R,
    clock: Box<dyn Clock>,
    config: StoreConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    dirty: bool,
}

impl<R: TaskRepository> TaskStore<R> {
    /// Hydrates a store from `repo` using wall-clock timestamps.
    pub fn open(repo: R, config: StoreConfig) -> Self {
        Self::with_clock(repo, config, SystemClock)
    }

    /// Hydrates a store from `repo` using a caller-provided clock.
    pub fn with_clock(repo: R, config: StoreConfig, clock: impl Clock + 'static) -> Self {
        let tasks = repo.load();
        Self {
            tasks,
            repo,
            clock: Box::new(clock),
            config,
            listeners: Vec::new(),
            next_subscription: 0,
            dirty: false,
        }
    }

    /// Current collection, most recently added first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Whether applied changes have not reached the repository yet.
    pub fn has_pending_writes(&self) -> bool {
        self.dirty
    }

    /// Creates an open task at the front of the collection.
    ///
    /// Blank titles are rejected with `EmptyTitle`.
    pub fn add_task(&mut self, new_task: impl Into<NewTask>) -> MutationOutcome<TaskId> {
        let new_task = new_task.into();
        let created_at = self.clock.now_epoch_ms();
        let mut task = match Task::new(
            &new_task.title,
            new_task.priority,
            new_task.due_date,
            created_at,
        ) {
            Ok(task) => task.with_details(new_task.notes.as_deref(), &new_task.tags),
            Err(_) => return self.reject("add", Rejection::EmptyTitle),
        };
        while self.get(task.id).is_some() {
            task.id = TaskId::new();
        }

        let id = task.id;
        self.tasks.insert(0, task);
        self.commit("add", id)
    }

    /// Flips open/done and returns the new status.
    pub fn toggle_task(&mut self, id: TaskId) -> MutationOutcome<TaskStatus> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return self.reject("toggle", Rejection::UnknownTask(id));
        };
        task.status = task.status.toggled();
        let status = task.status;
        self.commit("toggle", status)
    }

    /// Deletes a task permanently and returns it.
    pub fn remove_task(&mut self, id: TaskId) -> MutationOutcome<Task> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            return self.reject("remove", Rejection::UnknownTask(id));
        };
        let removed = self.tasks.remove(index);
        self.commit("remove", removed)
    }

    /// Applies a partial update; unspecified fields stay untouched.
    ///
    /// A blank title rejects the whole patch.
    pub fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> MutationOutcome<()> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            return self.reject("update", Rejection::UnknownTask(id));
        };
        if patch.is_empty() {
            return self.reject("update", Rejection::EmptyPatch);
        }
        if self.tasks[index].apply_patch(&patch).is_err() {
            return self.reject("update", Rejection::EmptyTitle);
        }
        self.commit("update", ())
    }

    /// Removes every done task in one batch; returns how many were removed.
    pub fn clear_done(&mut self) -> MutationOutcome<usize> {
        let before = self.tasks.len();
        self.tasks.retain(Task::is_open);
        let removed = before - self.tasks.len();
        if removed == 0 {
            return self.reject("clear_done", Rejection::NothingToClear);
        }
        self.commit("clear_done", removed)
    }

    /// Registers a listener called with the snapshot after each change.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Task]) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Writes pending changes. `Saved` when nothing was pending.
    pub fn flush(&mut self) -> Persistence {
        if !self.dirty {
            return Persistence::Saved;
        }
        self.persist("flush")
    }

    fn commit<T>(&mut self, op: &'static str, value: T) -> MutationOutcome<T> {
        let persistence = match self.config.flush_policy {
            FlushPolicy::Immediate => self.persist(op),
            FlushPolicy::Deferred => {
                self.dirty = true;
                Persistence::Pending
            }
        };
        debug!(
            "event=task_mutation module=store status=applied op={op} count={} persistence={persistence:?}",
            self.tasks.len()
        );
        self.notify();
        MutationOutcome::Applied { value, persistence }
    }

    fn reject<T>(&self, op: &'static str, rejection: Rejection) -> MutationOutcome<T> {
        debug!("event=task_mutation module=store status=rejected op={op} reason={rejection}");
        MutationOutcome::Rejected(rejection)
    }

    fn persist(&mut self, op: &'static str) -> Persistence {
        match self.repo.save(&self.tasks) {
            Ok(()) => {
                self.dirty = false;
                Persistence::Saved
            }
            Err(err) => {
                self.dirty = true;
                warn!(
                    "event=task_persist module=store status=error op={op} count={} error={}",
                    self.tasks.len(),
                    err
                );
                Persistence::Failed
            }
        }
    }

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.tasks);
        }
    }
}

impl<R: TaskRepository> Drop for TaskStore<R> {
    fn drop(&mut self) {
        if self.dirty {
            self.persist("drop");
        }
    }
}
