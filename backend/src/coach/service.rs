//! Failure-tolerant front for a coaching collaborator

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{AnalysisRequest, CheerRequest, CoachError, CoachFeedback, CoachingCollaborator};

/// Feedback when analysis fails outright
pub const ANALYSIS_FALLBACK: &str = "You're doing great! Rooting for you. 💪";
/// Feedback when the coach answered without a message
pub const ANALYSIS_EMPTY_FALLBACK: &str = "Nice challenge! ✨";
/// Cheer when the coach fails outright
pub const CHEER_FALLBACK: &str = "Nice! Keep it up! 👏";
/// Cheer when the coach answered with nothing
pub const CHEER_EMPTY_FALLBACK: &str = "Amazing! Cheering for you! ✨";

/// Wraps a collaborator with a timeout and fixed fallbacks
#[derive(Clone)]
pub struct CoachService {
    inner: Arc<dyn CoachingCollaborator>,
    timeout: Duration,
}

impl CoachService {
    pub fn new(inner: Arc<dyn CoachingCollaborator>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn collaborator_name(&self) -> &'static str {
        self.inner.name()
    }

    /// Feedback for a new entry; never fails
    pub async fn analyze(&self, request: &AnalysisRequest) -> CoachFeedback {
        let result = match tokio::time::timeout(self.timeout, self.inner.analyze(request)).await {
            Ok(result) => result,
            Err(_) => Err(CoachError::Timeout(self.timeout.as_secs())),
        };

        match result {
            Ok(feedback) => {
                debug!(entry_id = %request.entry.id(), "Coach feedback received");
                let message = if feedback.message.trim().is_empty() {
                    ANALYSIS_EMPTY_FALLBACK.to_string()
                } else {
                    feedback.message
                };
                CoachFeedback {
                    message,
                    estimated_calories: feedback
                        .estimated_calories
                        .filter(|kcal| kcal.is_finite() && *kcal >= 0.0),
                }
            }
            Err(e) => {
                record_fallback("analyze", &e);
                CoachFeedback {
                    message: ANALYSIS_FALLBACK.to_string(),
                    estimated_calories: Some(0.0),
                }
            }
        }
    }

    /// Encouragement text; never fails
    pub async fn cheer(&self, request: &CheerRequest) -> String {
        let result = match tokio::time::timeout(self.timeout, self.inner.cheer(request)).await {
            Ok(result) => result,
            Err(_) => Err(CoachError::Timeout(self.timeout.as_secs())),
        };

        match result {
            Ok(text) if text.trim().is_empty() => CHEER_EMPTY_FALLBACK.to_string(),
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                record_fallback("cheer", &e);
                CHEER_FALLBACK.to_string()
            }
        }
    }
}

fn record_fallback(operation: &'static str, error: &CoachError) {
    match error {
        CoachError::Disabled => debug!(operation, "Coaching disabled, using fallback"),
        _ => warn!(operation, error = %error, "Coach unavailable, using fallback"),
    }
    metrics::counter!("coach_fallback_total", "operation" => operation).increment(1);
}
