//! Profile service - business logic for the user profile and goal

use chrono::{DateTime, Utc};
use habit_coach_shared::validation::{get_missing_fields_labels, validate_goal, validate_profile};
use habit_coach_shared::{
    compute_target_calories, missing_profile_fields, CalorieTargetResponse, Goal, GoalResponse,
    ProfileResponse, SaveGoalRequest, SaveProfileRequest, UserProfile,
};
use tracing::{debug, info};
use validator::Validate;

use crate::error::ApiError;
use crate::repositories::HabitRepository;

/// Profile service for profile and goal operations
pub struct ProfileService;

impl ProfileService {
    /// Get the stored profile with the fields still missing for a calorie target
    pub async fn get_profile(repo: &HabitRepository) -> Result<ProfileResponse, ApiError> {
        let profile = repo
            .profile()
            .await
            .ok_or_else(|| ApiError::NotFound("Profile not set up".to_string()))?;
        Ok(Self::response(profile))
    }

    /// Save the profile form
    ///
    /// Keeps the existing id and goal, regenerates the avatar from the
    /// name and recomputes the daily calorie target. An incomplete profile
    /// is saved without a target; the response lists what is missing.
    pub async fn save_profile(
        repo: &HabitRepository,
        req: SaveProfileRequest,
    ) -> Result<ProfileResponse, ApiError> {
        req.validate()?;

        let display_name = req.display_name.trim().to_string();
        let mut profile = repo
            .profile()
            .await
            .unwrap_or_else(|| UserProfile::new(display_name.clone()));

        profile.avatar_url = UserProfile::avatar_url_for(&display_name);
        profile.display_name = display_name;
        profile.height_cm = req.height_cm;
        profile.current_weight_kg = req.current_weight_kg;
        profile.age = req.age;
        profile.gender = req.gender;
        profile.activity_level = req.activity_level;
        profile.goal_mode = req.goal_mode;
        validate_profile(&profile)?;

        profile.target_daily_calories = match compute_target_calories(&profile) {
            Ok(kcal) => Some(kcal),
            Err(e) => {
                debug!(reason = %e, "No calorie target for incomplete profile");
                None
            }
        };

        repo.save_profile(profile.clone()).await?;
        info!(
            profile_id = %profile.id,
            target_daily_calories = ?profile.target_daily_calories,
            "Profile saved"
        );

        Ok(Self::response(profile))
    }

    /// Daily calorie target for the stored profile
    ///
    /// Unlike `save_profile`, an incomplete profile is an error here,
    /// naming the first missing field.
    pub async fn calorie_target(repo: &HabitRepository) -> Result<CalorieTargetResponse, ApiError> {
        let profile = repo.profile().await.ok_or(ApiError::ProfileRequired)?;
        let target_daily_calories = compute_target_calories(&profile)?;
        Ok(CalorieTargetResponse { target_daily_calories })
    }

    /// Replace the active goal, snapshotting the current weight as its start
    pub async fn save_goal(
        repo: &HabitRepository,
        req: SaveGoalRequest,
    ) -> Result<GoalResponse, ApiError> {
        req.validate()?;
        let mut profile = repo.profile().await.ok_or(ApiError::ProfileRequired)?;

        let goal = Goal {
            description: req.description.trim().to_string(),
            deadline: req.deadline,
            weekly_exercise_target: req.weekly_exercise_target,
            start_weight_kg: profile.current_weight_kg,
            target_weight_kg: req.target_weight_kg,
        };
        validate_goal(&goal)?;

        profile.goal = Some(goal.clone());
        repo.save_profile(profile).await?;
        info!(deadline = %goal.deadline, "Goal saved");

        Ok(GoalResponse {
            message: Self::goal_message(&goal, Utc::now()),
            goal,
        })
    }

    fn goal_message(goal: &Goal, now: DateTime<Utc>) -> String {
        if goal.deadline < now {
            format!("Goal \"{}\" saved, but its deadline has already passed.", goal.description)
        } else {
            format!("Off you go toward \"{}\"! 🌈", goal.description)
        }
    }

    fn response(profile: UserProfile) -> ProfileResponse {
        let missing = missing_profile_fields(&profile);
        ProfileResponse {
            missing_fields: get_missing_fields_labels(&missing),
            profile,
        }
    }
}
