//! Error types for the Habit Coach domain

use thiserror::Error;

/// Domain-level error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Kind-specific fields do not match the entry kind
    #[error("Invalid entry kind: {0}")]
    InvalidEntryKind(String),

    /// A profile field required for calorie calculations is absent or not a number
    #[error("Missing profile field: {0}")]
    MissingProfileField(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn invalid_kind(msg: impl Into<String>) -> Self {
        DomainError::InvalidEntryKind(msg.into())
    }

    pub fn missing_field(label: impl Into<String>) -> Self {
        DomainError::MissingProfileField(label.into())
    }
}
