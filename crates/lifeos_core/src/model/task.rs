//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted by core.
//! - Provide title normalization and priority/status conversions.
//!
//! # Invariants
//! - `id` and `created_at` are assigned once and never change.
//! - `title` is trimmed and never empty.
//! - `priority` is always one of the three defined ordinals.
//! - `due_date` serializes as `YYYY-MM-DD`, so string order is date order.
//! - `notes` is trimmed and never blank; `tags` are trimmed, non-empty and
//!   unique, in first-seen order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a task within its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Urgency ordinal. Lower number means more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskPriority {
    Critical = 1,
    Normal = 2,
    Low = 3,
}

impl TaskPriority {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Normal
    }
}

impl TryFrom<u8> for TaskPriority {
    type Error = TaskValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Critical),
            2 => Ok(Self::Normal),
            3 => Ok(Self::Low),
            other => Err(TaskValidationError::InvalidPriority(i64::from(other))),
        }
    }
}

impl From<TaskPriority> for u8 {
    fn from(value: TaskPriority) -> Self {
        value.ordinal()
    }
}

impl FromStr for TaskPriority {
    type Err = TaskValidationError;

    /// Accepts either the ordinal (`1`..`3`) or the label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "1" | "critical" => Ok(Self::Critical),
            "2" | "normal" => Ok(Self::Normal),
            "3" | "low" => Ok(Self::Low),
            _ => Err(TaskValidationError::UnknownPriorityLabel(normalized)),
        }
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Done,
}

impl TaskStatus {
    /// Returns the opposite status.
    pub fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Done,
            Self::Done => Self::Open,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Done => "done",
        }
    }
}

/// Validation failures for task construction and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    InvalidPriority(i64),
    UnknownPriorityLabel(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::InvalidPriority(value) => {
                write!(f, "task priority must be 1, 2 or 3, got {value}")
            }
            Self::UnknownPriorityLabel(value) => write!(
                f,
                "unknown task priority `{value}`; expected critical|normal|low or 1|2|3"
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
///
/// Serialized with camelCase keys; `dueDate` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Task {
    /// Creates an open task with a generated id.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is blank after trimming.
    pub fn new(
        title: &str,
        priority: TaskPriority,
        due_date: Option<NaiveDate>,
        created_at: i64,
    ) -> Result<Self, TaskValidationError> {
        Self::with_id(TaskId::new(), title, priority, due_date, created_at)
    }

    /// Creates an open task with a caller-provided id.
    ///
    /// Used by the legacy loader, where identity already exists.
    pub fn with_id(
        id: TaskId,
        title: &str,
        priority: TaskPriority,
        due_date: Option<NaiveDate>,
        created_at: i64,
    ) -> Result<Self, TaskValidationError> {
        let title = normalize_title(title).ok_or(TaskValidationError::EmptyTitle)?;
        Ok(Self {
            id,
            title,
            status: TaskStatus::Open,
            priority,
            due_date,
            created_at,
            notes: None,
            tags: Vec::new(),
        })
    }

    /// Replaces notes and tags, normalizing both.
    pub fn with_details(mut self, notes: Option<&str>, tags: &[String]) -> Self {
        self.notes = notes.and_then(normalize_notes);
        self.tags = normalize_tags(tags);
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_date == Some(day)
    }

    /// Applies a patch after validating every field.
    ///
    /// Nothing is written when validation fails.
    pub fn apply_patch(&mut self, patch: &TaskPatch) -> Result<(), TaskValidationError> {
        let title = match patch.title.as_deref() {
            Some(raw) => Some(normalize_title(raw).ok_or(TaskValidationError::EmptyTitle)?),
            None => None,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.as_deref().and_then(normalize_notes);
        }
        if let Some(tags) = &patch.tags {
            self.tags = normalize_tags(tags);
        }
        Ok(())
    }
}

/// Serde mirror of `Task` used to validate decoded records.
///
/// Unknown keys are refused so older shapes that mix in `done` or `due`
/// go through the legacy loader instead of losing those fields.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TaskRecord {
    id: TaskId,
    title: String,
    status: TaskStatus,
    priority: TaskPriority,
    #[serde(default)]
    due_date: Option<NaiveDate>,
    created_at: i64,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let mut task = Task::with_id(
            record.id,
            &record.title,
            record.priority,
            record.due_date,
            record.created_at,
        )?
        .with_details(record.notes.as_deref(), &record.tags);
        task.status = record.status;
        Ok(task)
    }
}

/// Partial update for an existing task.
///
/// `due_date: Some(None)` clears the due date and `notes: Some(None)` clears
/// the notes; `None` leaves a field untouched. `tags` replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub notes: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.notes.is_none()
            && self.tags.is_none()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }
}

/// Input for `TaskStore::add_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl NewTask {
    /// Normal priority, no due date.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: TaskPriority::default(),
            due_date: None,
            notes: None,
            tags: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

impl From<&str> for NewTask {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Trims a title; returns `None` when nothing remains.
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims notes; blank notes become `None`.
pub fn normalize_notes(raw: &str) -> Option<String> {
    normalize_title(raw)
}

/// Trims tags, drops blanks and repeats.
pub fn normalize_tags(raw: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|kept| kept == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
