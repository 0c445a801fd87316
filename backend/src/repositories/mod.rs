//! Repositories
//!
//! Provides the data access layer over the snapshot store.

pub mod habits;
pub mod seed;

pub use habits::{EntryMerge, HabitRepository, HabitState, SnapshotKeys};
