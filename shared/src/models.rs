//! Data models for the Habit Coach application
//!
//! Entries are immutable once created except for two controlled mutations:
//! a one-time calorie fill after AI analysis and appends to the
//! encouragement list. Fields are therefore private and read through
//! accessors; everything else is plain data.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Content given to weight entries logged without a note
pub const DEFAULT_WEIGHT_CONTENT: &str = "Weighed in";

// ============================================================================
// Entry Types
// ============================================================================

/// Kind of logged action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Exercise,
    Diet,
    Weight,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Exercise => "exercise",
            EntryKind::Diet => "diet",
            EntryKind::Weight => "weight",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meal tag for diet entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietTag {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// Encouragement left on an entry by another user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encouragement {
    pub from_user_name: String,
    pub text: String,
}

/// User-supplied fields for a new entry
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub kind: EntryKind,
    pub content: String,
    pub diet_tag: Option<DietTag>,
    pub weight_kg: Option<f64>,
}

impl NewEntry {
    pub fn exercise(content: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Exercise,
            content: content.into(),
            diet_tag: None,
            weight_kg: None,
        }
    }

    pub fn diet(content: impl Into<String>, tag: Option<DietTag>) -> Self {
        Self {
            kind: EntryKind::Diet,
            content: content.into(),
            diet_tag: tag,
            weight_kg: None,
        }
    }

    pub fn weight(weight_kg: f64, note: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Weight,
            content: note.into(),
            diet_tag: None,
            weight_kg: Some(weight_kg),
        }
    }
}

/// One logged exercise, diet, or weight record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EntryRecord")]
pub struct Entry {
    id: Uuid,
    user_id: Uuid,
    /// Author name at creation time; not kept in sync with later renames
    user_name: String,
    kind: EntryKind,
    content: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diet_tag: Option<DietTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight_kg: Option<f64>,
    encouragements: Vec<Encouragement>,
}

/// Wire shape of an entry, checked before it becomes an `Entry`
#[derive(Deserialize)]
struct EntryRecord {
    id: Uuid,
    user_id: Uuid,
    user_name: String,
    kind: EntryKind,
    #[serde(default)]
    content: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    diet_tag: Option<DietTag>,
    #[serde(default)]
    calories: Option<f64>,
    #[serde(default)]
    weight_kg: Option<f64>,
    #[serde(default)]
    encouragements: Vec<Encouragement>,
}

impl TryFrom<EntryRecord> for Entry {
    type Error = DomainError;

    fn try_from(record: EntryRecord) -> Result<Self, Self::Error> {
        check_kind_fields(record.kind, record.diet_tag, record.weight_kg)?;
        if let Some(kcal) = record.calories {
            if !kcal.is_finite() || kcal < 0.0 {
                return Err(DomainError::Validation(
                    "Calories must be a non-negative number".to_string(),
                ));
            }
        }

        Ok(Entry {
            id: record.id,
            user_id: record.user_id,
            user_name: record.user_name,
            kind: record.kind,
            content: record.content,
            created_at: record.created_at,
            diet_tag: record.diet_tag,
            calories: record.calories,
            weight_kg: record.weight_kg,
            encouragements: record.encouragements,
        })
    }
}

/// `weight_kg` iff weight entry; `diet_tag` only on diet entries
fn check_kind_fields(
    kind: EntryKind,
    diet_tag: Option<DietTag>,
    weight_kg: Option<f64>,
) -> Result<(), DomainError> {
    match (kind, weight_kg) {
        (EntryKind::Weight, None) => {
            return Err(DomainError::invalid_kind("weight entries require weight_kg"));
        }
        (EntryKind::Weight, Some(kg)) if !kg.is_finite() || kg <= 0.0 => {
            return Err(DomainError::Validation(
                "Weight must be a positive number".to_string(),
            ));
        }
        (EntryKind::Exercise | EntryKind::Diet, Some(_)) => {
            return Err(DomainError::invalid_kind(format!(
                "weight_kg is only allowed on weight entries, not {kind}"
            )));
        }
        _ => {}
    }

    if diet_tag.is_some() && kind != EntryKind::Diet {
        return Err(DomainError::invalid_kind(format!(
            "diet_tag is only allowed on diet entries, not {kind}"
        )));
    }

    Ok(())
}

impl Entry {
    /// Create a new entry authored by `user_id`, checking kind-specific fields
    ///
    /// `created_at` is truncated to whole milliseconds, the precision
    /// snapshots store.
    pub fn new(
        user_id: Uuid,
        user_name: impl Into<String>,
        input: NewEntry,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        check_kind_fields(input.kind, input.diet_tag, input.weight_kg)?;

        let content = match input.kind {
            EntryKind::Weight if input.content.trim().is_empty() => {
                DEFAULT_WEIGHT_CONTENT.to_string()
            }
            _ => input.content,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            user_name: user_name.into(),
            kind: input.kind,
            content,
            created_at: created_at.trunc_subsecs(3),
            diet_tag: input.diet_tag,
            calories: None,
            weight_kg: input.weight_kg,
            encouragements: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn diet_tag(&self) -> Option<DietTag> {
        self.diet_tag
    }

    pub fn calories(&self) -> Option<f64> {
        self.calories
    }

    pub fn weight_kg(&self) -> Option<f64> {
        self.weight_kg
    }

    pub fn encouragements(&self) -> &[Encouragement] {
        &self.encouragements
    }

    pub fn is_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Set calories once; later fills and invalid values are ignored.
    ///
    /// Returns whether the value was stored.
    pub fn fill_calories(&mut self, kcal: f64) -> bool {
        if self.calories.is_some() || !kcal.is_finite() || kcal < 0.0 {
            return false;
        }
        self.calories = Some(kcal);
        true
    }

    pub fn add_encouragement(&mut self, encouragement: Encouragement) {
        self.encouragements.push(encouragement);
    }
}

// ============================================================================
// User Profile Types
// ============================================================================

/// Gender used for the BMR offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Mifflin-St Jeor constant; `Other` sits midway between the two
    pub fn bmr_offset(&self) -> f64 {
        match self {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
            Gender::Other => -78.0,
        }
    }
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Mostly desk work
    Sedentary,
    /// On your feet, light exercise
    Light,
    /// Moves a lot, exercise 2-3 times a week
    Moderate,
    /// Daily exercise
    Active,
    /// Hard training
    Athlete,
}

impl ActivityLevel {
    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::Athlete => 1.9,
        }
    }
}

/// Direction of the calorie target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalMode {
    Lose,
    Maintain,
    Gain,
}

impl GoalMode {
    /// Daily kcal added to TDEE
    pub fn calorie_adjustment(&self) -> f64 {
        match self {
            GoalMode::Lose => -500.0,
            GoalMode::Maintain => 0.0,
            GoalMode::Gain => 500.0,
        }
    }
}

/// A user's single active target; saving a new one replaces it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub description: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub deadline: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_exercise_target: Option<u32>,
    /// Profile weight when the goal was saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
}

/// User profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_mode: Option<GoalMode>,
    /// Recomputed on profile save only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_daily_calories: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
}

impl UserProfile {
    /// Create an empty profile with a fresh id
    pub fn new(display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            id: Uuid::new_v4(),
            avatar_url: Self::avatar_url_for(&display_name),
            display_name,
            height_cm: None,
            current_weight_kg: None,
            age: None,
            gender: None,
            activity_level: None,
            goal_mode: None,
            target_daily_calories: None,
            goal: None,
        }
    }

    /// Placeholder avatar seeded by display name
    pub fn avatar_url_for(display_name: &str) -> String {
        format!("https://picsum.photos/seed/{}/100/100", display_name)
    }
}
