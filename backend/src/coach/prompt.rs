//! Prompt text sent to the coaching model

use habit_coach_shared::{CoachingContext, Entry};

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Goal block included in analysis prompts
pub fn goal_block(context: &CoachingContext) -> String {
    let weekly = match context.weekly_exercise_target {
        Some(target) => format!("{} of {}", context.weekly_exercise_count, target),
        None => context.weekly_exercise_count.to_string(),
    };

    format!(
        "Goal: {goal}\n\
         Daily calorie target: {target} kcal\n\
         Eaten today: {eaten} kcal\n\
         Days remaining: {days}\n\
         Workouts this week: {weekly}\n\
         Current weight: {current}kg (target: {goal_weight}kg)\n",
        goal = context.goal_description,
        target = or_dash(context.target_daily_calories),
        eaten = context.calories_consumed_today.round(),
        days = context.days_remaining,
        current = or_dash(context.current_weight_kg),
        goal_weight = or_dash(context.target_weight_kg),
    )
}

/// Feedback prompt for a new entry
pub fn analysis_prompt(entry: &Entry, context: Option<&CoachingContext>) -> String {
    let goal = context.map(goal_block).unwrap_or_default();

    format!(
        "You are a personal coach. Give feedback on an entry logged by \"{name}\".\n\
         Entry: \"{content}\" ({kind})\n\
         {goal}\n\
         Instructions:\n\
         1. In 80 characters or fewer, give warm, specific advice that supports their goal.\n\
         2. If it is a meal, estimate its calories (kcal) from the description.\n\
         \n\
         Output format: JSON",
        name = entry.user_name(),
        content = entry.content(),
        kind = entry.kind(),
    )
}

/// Encouragement prompt for someone else's entry
pub fn cheer_prompt(entry: &Entry, cheerleader_name: &str) -> String {
    format!(
        "You are a kind friend on a social app.\n\
         Your friend \"{author}\" logged: \"{content}\".\n\
         Writing as \"{cheerleader_name}\", send one warm, uplifting comment.\n\
         \n\
         Rules:\n\
         - 50 characters or fewer.\n\
         - Praise the effort, never criticize.\n\
         - Casual, friendly tone.\n\
         - Use one or two emoji.",
        author = entry.user_name(),
        content = entry.content(),
    )
}
