//! Habit Coach Shared Library
//!
//! This crate contains the domain model, the metrics engine and the
//! request/response types used across the backend and WASM modules.

pub mod context;
pub mod errors;
pub mod feed;
pub mod metrics;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use context::CoachingContext;
pub use errors::*;
pub use feed::{filter_feed, FeedView};
pub use metrics::*;
pub use models::*;
pub use types::*;
