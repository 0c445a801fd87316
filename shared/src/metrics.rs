//! Metrics engine: calorie targets and aggregates over the entry log
//!
//! Every aggregate is a fold over the entry log filtered by a time window
//! and an entry kind. Nothing here holds state; callers pass the entries,
//! the profile and `now` on every call and recompute on every read.
//!
//! "Local" time means the time zone of the `now` argument. Weeks start on
//! Sunday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::models::{ActivityLevel, Entry, EntryKind, Gender, Goal, GoalMode, UserProfile};
use crate::validation::get_field_display_label;

const MS_PER_DAY: f64 = 86_400_000.0;

// ============================================================================
// BMR and Calorie Target
// ============================================================================

/// Calculate Basal Metabolic Rate using Mifflin-St Jeor equation
///
/// BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + offset
/// where offset is +5 (male), -161 (female), -78 (other)
pub fn calculate_bmr_mifflin(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years) + gender.bmr_offset()
}

/// Calculate Total Daily Energy Expenditure
///
/// TDEE = BMR × Activity Multiplier
pub fn calculate_tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.multiplier()
}

/// Apply the goal-mode deficit or surplus to a TDEE
pub fn goal_adjusted_calories(tdee: f64, goal_mode: GoalMode) -> f64 {
    tdee + goal_mode.calorie_adjustment()
}

/// Fields `compute_target_calories` needs that are absent or not finite
pub fn missing_profile_fields(profile: &UserProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !profile.current_weight_kg.is_some_and(f64::is_finite) {
        missing.push("current_weight_kg");
    }
    if !profile.height_cm.is_some_and(f64::is_finite) {
        missing.push("height_cm");
    }
    if profile.age.is_none() {
        missing.push("age");
    }
    if profile.gender.is_none() {
        missing.push("gender");
    }
    if profile.activity_level.is_none() {
        missing.push("activity_level");
    }
    if profile.goal_mode.is_none() {
        missing.push("goal_mode");
    }
    missing
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, DomainError> {
    value.ok_or_else(|| DomainError::missing_field(get_field_display_label(field)))
}

/// Daily calorie target for a profile, rounded to the nearest kcal
///
/// Fails with `MissingProfileField` naming the first field that is absent.
pub fn compute_target_calories(profile: &UserProfile) -> Result<i32, DomainError> {
    let weight_kg = require(profile.current_weight_kg.filter(|v| v.is_finite()), "current_weight_kg")?;
    let height_cm = require(profile.height_cm.filter(|v| v.is_finite()), "height_cm")?;
    let age = require(profile.age, "age")?;
    let gender = require(profile.gender, "gender")?;
    let activity_level = require(profile.activity_level, "activity_level")?;
    let goal_mode = require(profile.goal_mode, "goal_mode")?;

    let bmr = calculate_bmr_mifflin(weight_kg, height_cm, age, gender);
    let tdee = calculate_tdee(bmr, activity_level);
    Ok(goal_adjusted_calories(tdee, goal_mode).round() as i32)
}

// ============================================================================
// Time Windows
// ============================================================================

/// First instant of `date` in `tz`
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    // A DST gap can swallow midnight; the day then starts at the first valid hour
    (0..=2)
        .find_map(|h| {
            tz.from_local_datetime(&(midnight + Duration::hours(h)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Midnight local time of `now`'s calendar date
pub fn day_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    local_midnight(&now.timezone(), now.date_naive())
}

/// Midnight local time of the most recent Sunday
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let back = i64::from(now.weekday().num_days_from_sunday());
    local_midnight(&now.timezone(), now.date_naive() - Duration::days(back))
}

/// Whole days until `deadline`, rounded up
pub fn days_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (deadline - now).num_milliseconds() as f64;
    (ms / MS_PER_DAY).ceil() as i64
}

// ============================================================================
// Aggregates
// ============================================================================

/// Exercise entries logged since the start of the current week
pub fn weekly_exercise_count<'a, Tz: TimeZone>(
    entries: impl IntoIterator<Item = &'a Entry>,
    now: &DateTime<Tz>,
) -> usize {
    let since = week_start(now);
    entries
        .into_iter()
        .filter(|e| e.kind() == EntryKind::Exercise && e.created_at() >= since)
        .count()
}

/// Calories from diet entries logged since local midnight; absent counts as 0
pub fn daily_calories_consumed<'a, Tz: TimeZone>(
    entries: impl IntoIterator<Item = &'a Entry>,
    now: &DateTime<Tz>,
) -> f64 {
    let since = day_start(now);
    entries
        .into_iter()
        .filter(|e| e.kind() == EntryKind::Diet && e.created_at() >= since)
        .map(|e| e.calories().unwrap_or(0.0))
        .sum()
}

/// Calories left for today, never negative; 0 without a target
pub fn remaining_calories(profile: &UserProfile, consumed: f64) -> f64 {
    match profile.target_daily_calories {
        Some(target) => (f64::from(target) - consumed).max(0.0),
        None => 0.0,
    }
}

/// Share of today's target consumed, in [0, 100]; 0 without a positive target
pub fn calorie_percent(profile: &UserProfile, consumed: f64) -> f64 {
    match profile.target_daily_calories {
        Some(target) if target > 0 => (100.0 * consumed / f64::from(target)).clamp(0.0, 100.0),
        _ => 0.0,
    }
}

/// Weight from the most recent weight entry, or `fallback` when there is none
pub fn latest_weight<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    fallback: Option<f64>,
) -> Option<f64> {
    entries
        .into_iter()
        .filter(|e| e.kind() == EntryKind::Weight)
        .filter_map(|e| e.weight_kg().map(|kg| (e.created_at(), kg)))
        .max_by_key(|(created_at, _)| *created_at)
        .map(|(_, kg)| kg)
        .or(fallback)
}

/// Weight progress toward a goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightProgress {
    /// Current minus target (positive = still above target)
    pub diff_kg: f64,
    /// Share of the start→target distance covered, in [0, 100]
    pub percent: f64,
}

/// Progress from the goal's start weight toward its target
///
/// `None` unless start, target and current weights are all known. When
/// start equals target the goal counts as met only at exactly that weight.
pub fn weight_goal_progress(goal: &Goal, current_weight: Option<f64>) -> Option<WeightProgress> {
    let start = goal.start_weight_kg?;
    let target = goal.target_weight_kg?;
    let current = current_weight?;

    let span = start - target;
    let percent = if span == 0.0 {
        if current == target { 100.0 } else { 0.0 }
    } else {
        (100.0 * (start - current) / span).clamp(0.0, 100.0)
    };

    Some(WeightProgress {
        diff_kg: current - target,
        percent,
    })
}

// ============================================================================
// Activity Summary
// ============================================================================

/// Everything the dashboard shows for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub weekly_exercise_count: usize,
    pub weekly_exercise_target: Option<u32>,
    pub calories_consumed: f64,
    pub target_daily_calories: Option<i32>,
    pub calories_remaining: f64,
    pub calorie_percent: f64,
    pub current_weight_kg: Option<f64>,
    pub target_weight_kg: Option<f64>,
    pub weight_progress: Option<WeightProgress>,
    pub goal_description: Option<String>,
    pub days_remaining: Option<i64>,
}

impl ActivitySummary {
    /// Summarize the profile owner's entries; other users' entries are ignored
    pub fn compute<Tz: TimeZone>(entries: &[Entry], profile: &UserProfile, now: &DateTime<Tz>) -> Self {
        let own = || entries.iter().filter(|e| e.is_by(profile.id));

        let consumed = daily_calories_consumed(own(), now);
        let current_weight = latest_weight(own(), profile.current_weight_kg);
        let goal = profile.goal.as_ref();

        Self {
            weekly_exercise_count: weekly_exercise_count(own(), now),
            weekly_exercise_target: goal.and_then(|g| g.weekly_exercise_target),
            calories_consumed: consumed,
            target_daily_calories: profile.target_daily_calories,
            calories_remaining: remaining_calories(profile, consumed),
            calorie_percent: calorie_percent(profile, consumed),
            current_weight_kg: current_weight,
            target_weight_kg: goal.and_then(|g| g.target_weight_kg),
            weight_progress: goal.and_then(|g| weight_goal_progress(g, current_weight)),
            goal_description: goal.map(|g| g.description.clone()),
            days_remaining: goal.map(|g| days_remaining(g.deadline, now.with_timezone(&Utc))),
        }
    }
}
