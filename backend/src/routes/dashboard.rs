//! Dashboard API route

use crate::error::ApiError;
use crate::services::HabitService;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use habit_coach_shared::DashboardResponse;

/// Create dashboard routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

/// GET /api/v1/dashboard - Today's calories, this week's exercise and goal progress
async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    let dashboard = HabitService::dashboard(state.repo(), state.now()).await?;
    Ok(Json(dashboard))
}
