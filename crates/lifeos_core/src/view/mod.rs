//! Read-only projections over the task collection.
//!
//! # Invariants
//! - Views are pure: same tasks and same `today` give the same output.
//! - Views never mutate or own tasks.

pub mod task_views;
