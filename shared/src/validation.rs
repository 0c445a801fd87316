//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Request types additionally use the `validator` crate derive macros
//! (see `types`).

use crate::models::{Goal, UserProfile};

/// Validate weight value (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg < 20.0 {
        return Err("Weight must be at least 20 kg".to_string());
    }
    if weight_kg > 500.0 {
        return Err("Weight must be at most 500 kg".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
/// Valid range: 50-300 cm
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm < 50.0 {
        return Err("Height must be at least 50 cm".to_string());
    }
    if height_cm > 300.0 {
        return Err("Height must be at most 300 cm".to_string());
    }
    Ok(())
}

/// Validate age in years
pub fn validate_age(age: u32) -> Result<(), String> {
    if age < 1 {
        return Err("Age must be at least 1 year".to_string());
    }
    if age > 150 {
        return Err("Age cannot exceed 150 years".to_string());
    }
    Ok(())
}

/// Validate display name
pub fn validate_display_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.chars().count() > 50 {
        return Err("Name must be at most 50 characters".to_string());
    }
    Ok(())
}

/// Check every body field that is present on a profile
pub fn validate_profile(profile: &UserProfile) -> Result<(), ValidationError> {
    validate_display_name(&profile.display_name)
        .map_err(|msg| ValidationError::new("display_name", &msg))?;
    if let Some(height) = profile.height_cm {
        validate_height_cm(height).map_err(|msg| ValidationError::new("height_cm", &msg))?;
    }
    if let Some(weight) = profile.current_weight_kg {
        validate_weight(weight).map_err(|msg| ValidationError::new("current_weight_kg", &msg))?;
    }
    if let Some(age) = profile.age {
        validate_age(age).map_err(|msg| ValidationError::new("age", &msg))?;
    }
    if let Some(goal) = &profile.goal {
        validate_goal(goal)?;
    }
    Ok(())
}

/// Validate a goal before it replaces the active one
pub fn validate_goal(goal: &Goal) -> Result<(), ValidationError> {
    if goal.description.trim().is_empty() {
        return Err(ValidationError::new("description", "Goal description cannot be empty"));
    }
    if let Some(target) = goal.target_weight_kg {
        validate_weight(target).map_err(|msg| ValidationError::new("target_weight_kg", &msg))?;
    }
    Ok(())
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "display_name" => "Name",
        "weight" | "current_weight_kg" | "weight_kg" => "Current Weight",
        "height" | "height_cm" => "Height",
        "age" => "Age",
        "gender" => "Gender",
        "activity_level" => "Activity Level",
        "goal_mode" => "Goal Mode",
        "target_daily_calories" => "Daily Calorie Target",
        "description" => "Goal",
        "deadline" => "Deadline",
        "weekly_exercise_target" => "Weekly Exercise Target",
        "target_weight_kg" => "Target Weight",
        "content" => "Note",
        _ => field_name,
    }
}

/// Convert a list of technical field names to user-friendly labels
pub fn get_missing_fields_labels(fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .map(|f| get_field_display_label(f).to_string())
        .collect()
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}
