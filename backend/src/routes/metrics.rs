//! Prometheus scrape endpoint

use axum::extract::State;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /metrics - Prometheus text exposition
pub async fn render_metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| ApiError::NotFound("Metrics recorder not installed".to_string()))
}
