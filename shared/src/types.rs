//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::feed::FeedView;
use crate::metrics::ActivitySummary;
use crate::models::{
    ActivityLevel, DietTag, Encouragement, Entry, EntryKind, Gender, Goal, GoalMode, NewEntry,
    UserProfile,
};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// ============================================================================
// Entry Types
// ============================================================================

/// New entry submitted from the log form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitEntryRequest {
    pub kind: EntryKind,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Content cannot exceed 1000 characters"))]
    pub content: String,
    #[serde(default)]
    pub diet_tag: Option<DietTag>,
    #[serde(default)]
    #[validate(range(min = 20.0, max = 500.0, message = "Weight must be between 20 and 500 kg"))]
    pub weight_kg: Option<f64>,
}

impl From<SubmitEntryRequest> for NewEntry {
    fn from(req: SubmitEntryRequest) -> Self {
        NewEntry {
            kind: req.kind,
            content: req.content,
            diet_tag: req.diet_tag,
            weight_kg: req.weight_kg,
        }
    }
}

/// Stored entry plus the coach's feedback on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitEntryResponse {
    pub entry: Entry,
    pub message: String,
}

/// Entry after a cheer was appended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheerResponse {
    pub entry: Entry,
    pub encouragement: Encouragement,
}

/// Feed query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub view: FeedView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub view: FeedView,
    pub entries: Vec<Entry>,
}

// ============================================================================
// Profile and Goal Types
// ============================================================================

/// Profile form contents; absent body fields stay unset
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveProfileRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub display_name: String,
    #[serde(default)]
    #[validate(range(min = 50.0, max = 300.0, message = "Height must be between 50 and 300 cm"))]
    pub height_cm: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 20.0, max = 500.0, message = "Weight must be between 20 and 500 kg"))]
    pub current_weight_kg: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default)]
    pub goal_mode: Option<GoalMode>,
}

/// Saved profile and the labels of fields still needed for a calorie target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub missing_fields: Vec<String>,
}

/// Daily calorie target computed from the stored profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalorieTargetResponse {
    pub target_daily_calories: i32,
}

/// Goal form contents
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Goal must be between 1 and 200 characters"))]
    pub description: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    #[validate(range(min = 1, max = 50, message = "Weekly target must be between 1 and 50"))]
    pub weekly_exercise_target: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 20.0, max = 500.0, message = "Target weight must be between 20 and 500 kg"))]
    pub target_weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalResponse {
    pub goal: Goal,
    pub message: String,
}

/// Dashboard numbers for the current user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub display_name: String,
    pub avatar_url: String,
    pub summary: ActivitySummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    #[test]
    fn test_submit_request_ranges() {
        let content: String = Sentence(3..8).fake();
        let req = SubmitEntryRequest {
            kind: EntryKind::Weight,
            content,
            diet_tag: None,
            weight_kg: Some(68.0),
        };
        assert!(req.validate().is_ok());

        let heavy = SubmitEntryRequest {
            weight_kg: Some(900.0),
            ..req.clone()
        };
        let errors = heavy.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("weight_kg"));

        let long = SubmitEntryRequest {
            content: "x".repeat(1001),
            ..req
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_submit_request_defaults() {
        let req: SubmitEntryRequest = serde_json::from_str(r#"{"kind":"exercise"}"#).unwrap();
        assert_eq!(req.content, "");
        assert!(req.weight_kg.is_none());
        assert!(serde_json::from_str::<SubmitEntryRequest>(r#"{"kind":"sleep"}"#).is_err());
    }

    #[test]
    fn test_profile_request_ranges() {
        let req: SaveProfileRequest =
            serde_json::from_str(r#"{"display_name":"Kenta","age":0}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("age"));

        let req: SaveProfileRequest = serde_json::from_str(
            r#"{"display_name":"Kenta","height_cm":172,"current_weight_kg":70,"gender":"male"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_goal_request_deadline_in_millis() {
        let req: SaveGoalRequest = serde_json::from_str(
            r#"{"description":"Lose 3kg","deadline":1717200000000,"target_weight_kg":67}"#,
        )
        .unwrap();
        assert_eq!(req.deadline.timestamp_millis(), 1_717_200_000_000);
        assert!(req.validate().is_ok());

        let empty = SaveGoalRequest {
            description: String::new(),
            ..req
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_feed_query_defaults_to_everyone() {
        let query: FeedQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.view, FeedView::Everyone);
    }
}
