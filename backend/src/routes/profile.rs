//! User profile and goal API routes

use crate::error::ApiError;
use crate::services::ProfileService;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use habit_coach_shared::{
    CalorieTargetResponse, GoalResponse, ProfileResponse, SaveGoalRequest, SaveProfileRequest,
};

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(save_profile))
        .route("/goal", put(save_goal))
        .route("/target", get(get_calorie_target))
}

/// GET /api/v1/profile - Get the profile and what it still lacks
async fn get_profile(State(state): State<AppState>) -> Result<Json<ProfileResponse>, ApiError> {
    Ok(Json(ProfileService::get_profile(state.repo()).await?))
}

/// PUT /api/v1/profile - Create or update the profile
async fn save_profile(
    State(state): State<AppState>,
    Json(req): Json<SaveProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    Ok(Json(ProfileService::save_profile(state.repo(), req).await?))
}

/// GET /api/v1/profile/target - Daily calorie target, 422 while the profile is incomplete
async fn get_calorie_target(
    State(state): State<AppState>,
) -> Result<Json<CalorieTargetResponse>, ApiError> {
    Ok(Json(ProfileService::calorie_target(state.repo()).await?))
}

/// PUT /api/v1/profile/goal - Replace the active goal
async fn save_goal(
    State(state): State<AppState>,
    Json(req): Json<SaveGoalRequest>,
) -> Result<Json<GoalResponse>, ApiError> {
    Ok(Json(ProfileService::save_goal(state.repo(), req).await?))
}
