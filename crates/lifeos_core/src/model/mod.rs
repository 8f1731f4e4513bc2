//! Domain model for the task list and the dashboard feeds.
//!
//! # Responsibility
//! - Define the canonical task record and its validation rules.
//! - Type the boundary contracts of external dashboard feeds.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is destructive; there are no tombstones.

pub mod feeds;
pub mod task;
