//! Habit Coach WASM Module
//!
//! This crate provides WebAssembly bindings for the metrics engine, so a
//! browser front end that keeps its log client-side computes the same
//! calorie targets, dashboard numbers and feed views as the server.
//!
//! Values cross the boundary as JSON strings in the same shapes the HTTP
//! API uses. Times are epoch milliseconds plus the viewer's offset in
//! minutes east of UTC (the negation of JS `Date#getTimezoneOffset`).

use chrono::{DateTime, FixedOffset, Utc};
use habit_coach_shared::validation::{get_missing_fields_labels, validate_profile};
use habit_coach_shared::{
    compute_target_calories, filter_feed, missing_profile_fields, ActivitySummary, Entry, FeedView,
    UserProfile,
};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

/// Daily calorie target for a profile
///
/// Errors name the first missing field by its form label.
#[wasm_bindgen]
pub fn target_calories(profile_json: &str) -> Result<i32, JsValue> {
    target_calories_inner(profile_json).map_err(|e| JsValue::from_str(&e))
}

/// Form labels of the fields still needed for a calorie target, as a JSON array
#[wasm_bindgen]
pub fn missing_fields(profile_json: &str) -> Result<String, JsValue> {
    missing_fields_inner(profile_json).map_err(|e| JsValue::from_str(&e))
}

/// Dashboard summary of the profile owner's entries, as JSON
#[wasm_bindgen]
pub fn activity_summary(
    entries_json: &str,
    profile_json: &str,
    now_ms: f64,
    utc_offset_minutes: i32,
) -> Result<String, JsValue> {
    activity_summary_inner(entries_json, profile_json, now_ms, utc_offset_minutes)
        .map_err(|e| JsValue::from_str(&e))
}

/// Entries visible in `view` ("everyone" or "mine") for `viewer_id`, as JSON
///
/// An empty `viewer_id` means no profile yet.
#[wasm_bindgen]
pub fn feed(entries_json: &str, view: &str, viewer_id: &str) -> Result<String, JsValue> {
    feed_inner(entries_json, view, viewer_id).map_err(|e| JsValue::from_str(&e))
}

fn parse_profile(profile_json: &str) -> Result<UserProfile, String> {
    let profile: UserProfile =
        serde_json::from_str(profile_json).map_err(|e| format!("Invalid profile: {e}"))?;
    validate_profile(&profile).map_err(|e| e.user_message())?;
    Ok(profile)
}

fn parse_entries(entries_json: &str) -> Result<Vec<Entry>, String> {
    serde_json::from_str(entries_json).map_err(|e| format!("Invalid entries: {e}"))
}

fn local_now(now_ms: f64, utc_offset_minutes: i32) -> Result<DateTime<FixedOffset>, String> {
    let offset = utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| format!("Invalid UTC offset: {utc_offset_minutes} minutes"))?;
    let now = DateTime::<Utc>::from_timestamp_millis(now_ms as i64)
        .ok_or_else(|| format!("Invalid timestamp: {now_ms}"))?;
    Ok(now.with_timezone(&offset))
}

fn target_calories_inner(profile_json: &str) -> Result<i32, String> {
    let profile = parse_profile(profile_json)?;
    compute_target_calories(&profile).map_err(|e| e.to_string())
}

fn missing_fields_inner(profile_json: &str) -> Result<String, String> {
    let profile = parse_profile(profile_json)?;
    let labels = get_missing_fields_labels(&missing_profile_fields(&profile));
    serde_json::to_string(&labels).map_err(|e| e.to_string())
}

fn activity_summary_inner(
    entries_json: &str,
    profile_json: &str,
    now_ms: f64,
    utc_offset_minutes: i32,
) -> Result<String, String> {
    let entries = parse_entries(entries_json)?;
    let profile = parse_profile(profile_json)?;
    let now = local_now(now_ms, utc_offset_minutes)?;
    let summary = ActivitySummary::compute(&entries, &profile, &now);
    serde_json::to_string(&summary).map_err(|e| e.to_string())
}

fn feed_inner(entries_json: &str, view: &str, viewer_id: &str) -> Result<String, String> {
    let entries = parse_entries(entries_json)?;
    let view: FeedView = serde_json::from_value(serde_json::Value::String(view.to_string()))
        .map_err(|_| format!("Unknown feed view: {view}"))?;
    let viewer = match viewer_id.trim() {
        "" => None,
        id => Some(Uuid::parse_str(id).map_err(|e| format!("Invalid viewer id: {e}"))?),
    };
    serde_json::to_string(&filter_feed(&entries, view, viewer)).map_err(|e| e.to_string())
}
