//! Core use-case services.
//!
//! # Responsibility
//! - Own mutable task state on behalf of presentation layers.
//! - Keep presentation code decoupled from storage details.

pub mod task_store;
