//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the repository and the coaching collaborator.

pub mod habits;
pub mod profile;

pub use habits::HabitService;
pub use profile::ProfileService;
