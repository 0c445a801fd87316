//! Goal-aware context handed to the coaching collaborator
//!
//! The collaborator only writes the words; the numbers it is told about
//! come from here and must agree with what the dashboard shows.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{daily_calories_consumed, days_remaining, latest_weight, weekly_exercise_count};
use crate::models::{Entry, EntryKind, UserProfile};

/// Snapshot of a user's standing against their goal at analysis time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingContext {
    pub goal_description: String,
    pub target_daily_calories: Option<i32>,
    pub calories_consumed_today: f64,
    pub days_remaining: i64,
    pub weekly_exercise_count: usize,
    pub weekly_exercise_target: Option<u32>,
    pub current_weight_kg: Option<f64>,
    pub target_weight_kg: Option<f64>,
}

impl CoachingContext {
    /// Build the context for `new_entry`, or `None` when the profile has no goal.
    ///
    /// `history` is the log as it was before `new_entry` was added. Only the
    /// profile owner's entries are considered.
    pub fn assemble<Tz: TimeZone>(
        new_entry: &Entry,
        history: &[Entry],
        profile: &UserProfile,
        now: &DateTime<Tz>,
    ) -> Option<Self> {
        let goal = profile.goal.as_ref()?;
        let own = || {
            history
                .iter()
                .filter(|e| e.is_by(profile.id) && e.id() != new_entry.id())
        };

        let mut exercise_count = weekly_exercise_count(own(), now);
        if new_entry.kind() == EntryKind::Exercise {
            exercise_count += 1;
        }

        let current_weight = match new_entry.kind() {
            EntryKind::Weight => new_entry.weight_kg(),
            _ => latest_weight(own(), profile.current_weight_kg),
        };

        Some(Self {
            goal_description: goal.description.clone(),
            target_daily_calories: profile.target_daily_calories,
            calories_consumed_today: daily_calories_consumed(own(), now),
            days_remaining: days_remaining(goal.deadline, now.with_timezone(&Utc)),
            weekly_exercise_count: exercise_count,
            weekly_exercise_target: goal.weekly_exercise_target,
            current_weight_kg: current_weight,
            target_weight_kg: goal.target_weight_kg,
        })
    }
}
