//! AI coaching collaborator
//!
//! The collaborator writes feedback for new entries (with a calorie
//! estimate for meals) and short cheers for other users' entries. Calls
//! may fail in many ways; `CoachService` turns every failure into a fixed
//! fallback so callers always get an answer.

use async_trait::async_trait;
use habit_coach_shared::{CoachingContext, Entry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod gemini;
pub mod prompt;
pub mod service;

pub use gemini::GeminiCoach;
pub use service::{
    CoachService, ANALYSIS_EMPTY_FALLBACK, ANALYSIS_FALLBACK, CHEER_EMPTY_FALLBACK, CHEER_FALLBACK,
};

/// Reasons the collaborator could not produce an answer
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Coaching is disabled")]
    Disabled,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Coach API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse coach response: {0}")]
    Parse(String),

    #[error("Coach did not answer within {0} seconds")]
    Timeout(u64),
}

/// A new entry to give feedback on
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub entry: Entry,
    /// Goal standing; `None` when the author has no goal
    pub context: Option<CoachingContext>,
}

/// Someone cheering on an entry
#[derive(Debug, Clone)]
pub struct CheerRequest {
    pub entry: Entry,
    pub cheerleader_name: String,
}

/// Feedback on a new entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachFeedback {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_calories: Option<f64>,
}

/// Something that can write coaching text
#[async_trait]
pub trait CoachingCollaborator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn analyze(&self, request: &AnalysisRequest) -> Result<CoachFeedback, CoachError>;

    async fn cheer(&self, request: &CheerRequest) -> Result<String, CoachError>;
}

/// Used when coaching is turned off or no API key is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCoach;

#[async_trait]
impl CoachingCollaborator for DisabledCoach {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn analyze(&self, _request: &AnalysisRequest) -> Result<CoachFeedback, CoachError> {
        Err(CoachError::Disabled)
    }

    async fn cheer(&self, _request: &CheerRequest) -> Result<String, CoachError> {
        Err(CoachError::Disabled)
    }
}
