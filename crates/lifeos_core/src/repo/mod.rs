//! Task persistence over durable key-value slots.
//!
//! # Responsibility
//! - Round-trip the full task collection through one storage slot.
//! - Map every historical stored shape to the canonical `Task`.
//!
//! # Invariants
//! - Loading never fails towards the caller; doubtful data loads as empty.
//! - Saving always writes the canonical shape as one JSON array.

pub mod legacy;
pub mod task_repo;
