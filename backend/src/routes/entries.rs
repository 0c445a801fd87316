//! Habit entry API routes

use crate::error::ApiError;
use crate::services::HabitService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use habit_coach_shared::{
    CheerResponse, FeedQuery, FeedResponse, SubmitEntryRequest, SubmitEntryResponse,
};
use uuid::Uuid;

/// Create entry routes
pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_feed).post(submit_entry))
        .route("/:id/cheers", post(cheer_entry))
}

/// GET /api/v1/entries?view=everyone|mine - The feed, newest first
async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Json<FeedResponse> {
    Json(HabitService::feed(state.repo(), query.view).await)
}

/// POST /api/v1/entries - Log an exercise, meal or weigh-in
///
/// The entry is stored before coaching runs; the response carries the
/// coach's message and the entry with any calorie estimate filled in.
async fn submit_entry(
    State(state): State<AppState>,
    Json(req): Json<SubmitEntryRequest>,
) -> Result<(StatusCode, Json<SubmitEntryResponse>), ApiError> {
    let now = state.now();
    let response = HabitService::submit_entry(&state, req, now).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/entries/:id/cheers - Cheer on an entry
async fn cheer_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<CheerResponse>), ApiError> {
    let response = HabitService::cheer(&state, id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
