//! Habit service - logging entries, cheers, feed and dashboard
//!
//! Coaching calls run in spawned tasks that own a clone of the state. A
//! handler awaits the task to return the coach's words, but if the client
//! disconnects the task still finishes and its merge is still applied.

use chrono::{DateTime, FixedOffset, Utc};
use habit_coach_shared::{
    filter_feed, ActivitySummary, CheerResponse, CoachingContext, DashboardResponse, Encouragement,
    Entry, FeedResponse, FeedView, SubmitEntryRequest, SubmitEntryResponse,
};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::coach::{AnalysisRequest, CheerRequest, ANALYSIS_FALLBACK};
use crate::error::ApiError;
use crate::repositories::{EntryMerge, HabitRepository};
use crate::state::AppState;

/// Habit service for entry operations
pub struct HabitService;

impl HabitService {
    /// Log a new entry for the profile owner and get coaching feedback
    ///
    /// The entry is stored before the coach is asked, so a slow or failing
    /// coach never loses a log. The calorie estimate is filled in afterwards
    /// by entry id.
    pub async fn submit_entry(
        state: &AppState,
        req: SubmitEntryRequest,
        now: DateTime<FixedOffset>,
    ) -> Result<SubmitEntryResponse, ApiError> {
        req.validate()?;
        let profile = state.repo().profile().await.ok_or(ApiError::ProfileRequired)?;

        let entry = Entry::new(
            profile.id,
            profile.display_name.clone(),
            req.into(),
            now.with_timezone(&Utc),
        )?;
        let history = state.repo().prepend_entry(entry.clone()).await?;

        metrics::counter!("habit_entries_submitted_total", "kind" => entry.kind().as_str())
            .increment(1);
        info!(entry_id = %entry.id(), kind = %entry.kind(), "Entry logged");

        let request = AnalysisRequest {
            context: CoachingContext::assemble(&entry, &history, &profile, &now),
            entry: entry.clone(),
        };
        let task = tokio::spawn(Self::run_analysis(state.clone(), request));

        match task.await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!(entry_id = %entry.id(), error = %e, "Analysis task failed");
                Ok(SubmitEntryResponse {
                    entry,
                    message: ANALYSIS_FALLBACK.to_string(),
                })
            }
        }
    }

    async fn run_analysis(state: AppState, request: AnalysisRequest) -> SubmitEntryResponse {
        let feedback = state.coach().analyze(&request).await;
        let entry_id = request.entry.id();

        let entry = match feedback.estimated_calories {
            Some(kcal) => match state.repo().apply(entry_id, EntryMerge::FillCalories(kcal)).await {
                Ok(Some(updated)) => updated,
                Ok(None) => request.entry,
                Err(e) => {
                    warn!(entry_id = %entry_id, error = %e, "Could not store calorie estimate");
                    request.entry
                }
            },
            None => request.entry,
        };

        SubmitEntryResponse {
            entry,
            message: feedback.message,
        }
    }

    /// Cheer on an entry as the profile owner
    pub async fn cheer(state: &AppState, entry_id: Uuid) -> Result<CheerResponse, ApiError> {
        let profile = state.repo().profile().await.ok_or(ApiError::ProfileRequired)?;
        let entry = state
            .repo()
            .find_entry(entry_id)
            .await
            .ok_or_else(|| ApiError::NotFound("Entry not found".to_string()))?;

        let request = CheerRequest {
            entry,
            cheerleader_name: profile.display_name,
        };
        tokio::spawn(Self::run_cheer(state.clone(), request))
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("cheer task failed: {e}")))?
    }

    async fn run_cheer(state: AppState, request: CheerRequest) -> Result<CheerResponse, ApiError> {
        let text = state.coach().cheer(&request).await;
        let encouragement = Encouragement {
            from_user_name: request.cheerleader_name.clone(),
            text,
        };

        let merged = state
            .repo()
            .apply(
                request.entry.id(),
                EntryMerge::AppendEncouragement(encouragement.clone()),
            )
            .await?;

        match merged {
            Some(entry) => {
                metrics::counter!("habit_cheers_total").increment(1);
                info!(entry_id = %entry.id(), "Cheer added");
                Ok(CheerResponse {
                    entry,
                    encouragement,
                })
            }
            None => Err(ApiError::NotFound("Entry not found".to_string())),
        }
    }

    /// Entries visible in `view`, newest first
    ///
    /// Without a profile there is no "mine", so everyone's feed is shown.
    pub async fn feed(repo: &HabitRepository, view: FeedView) -> FeedResponse {
        let state = repo.snapshot().await;
        let viewer = state.profile.as_ref().map(|p| p.id);
        let view = match (view, viewer) {
            (FeedView::Mine, Some(_)) => FeedView::Mine,
            _ => FeedView::Everyone,
        };

        FeedResponse {
            view,
            entries: filter_feed(&state.entries, view, viewer)
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// Dashboard numbers for the profile owner
    pub async fn dashboard(
        repo: &HabitRepository,
        now: DateTime<FixedOffset>,
    ) -> Result<DashboardResponse, ApiError> {
        let state = repo.snapshot().await;
        let profile = state.profile.ok_or(ApiError::ProfileRequired)?;

        Ok(DashboardResponse {
            summary: ActivitySummary::compute(&state.entries, &profile, &now),
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::{
        CoachError, CoachFeedback, CoachService, CoachingCollaborator, DisabledCoach,
        CHEER_FALLBACK,
    };
    use crate::config::AppConfig;
    use crate::repositories::SnapshotKeys;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use chrono::Duration;
    use habit_coach_shared::{DietTag, EntryKind, Goal, NewEntry, UserProfile};
    use std::sync::{Arc, Mutex};
    use std::time::Duration as StdDuration;

    /// Records what the coach was asked
    #[derive(Default)]
    struct Recording {
        contexts: Mutex<Vec<Option<CoachingContext>>>,
    }

    #[async_trait]
    impl CoachingCollaborator for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn analyze(&self, request: &AnalysisRequest) -> Result<CoachFeedback, CoachError> {
            self.contexts.lock().unwrap().push(request.context.clone());
            Ok(CoachFeedback {
                message: format!("Nice {}!", request.entry.kind()),
                estimated_calories: (request.entry.kind() == EntryKind::Diet).then_some(480.0),
            })
        }

        async fn cheer(&self, request: &CheerRequest) -> Result<String, CoachError> {
            Ok(format!("Go {}! 🎉", request.entry.user_name()))
        }
    }

    async fn state_with(coach: Arc<dyn CoachingCollaborator>) -> AppState {
        let repo = HabitRepository::load(Arc::new(MemoryStore::new()), SnapshotKeys::default(), false)
            .await
            .unwrap();
        AppState::new(
            Arc::new(repo),
            CoachService::new(coach, StdDuration::from_secs(5)),
            AppConfig::default(),
        )
    }

    async fn with_profile(state: &AppState) -> UserProfile {
        let mut profile = UserProfile::new("Kenta");
        profile.current_weight_kg = Some(72.0);
        profile.target_daily_calories = Some(2100);
        profile.goal = Some(Goal {
            description: "Run 10km".to_string(),
            deadline: Utc::now() + Duration::days(20),
            weekly_exercise_target: Some(3),
            start_weight_kg: Some(72.0),
            target_weight_kg: Some(70.0),
        });
        state.repo().save_profile(profile.clone()).await.unwrap();
        profile
    }

    fn diet(content: &str) -> SubmitEntryRequest {
        SubmitEntryRequest {
            kind: EntryKind::Diet,
            content: content.to_string(),
            diet_tag: Some(DietTag::Lunch),
            weight_kg: None,
        }
    }

    fn now() -> DateTime<FixedOffset> {
        Utc::now().fixed_offset()
    }

    #[tokio::test]
    async fn test_submit_requires_profile() {
        let state = state_with(Arc::new(DisabledCoach)).await;
        let err = HabitService::submit_entry(&state, diet("Soba"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ProfileRequired));
        assert!(state.repo().entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_fills_calories_from_feedback() {
        let state = state_with(Arc::new(Recording::default())).await;
        let profile = with_profile(&state).await;

        let response = HabitService::submit_entry(&state, diet("Soba"), now())
            .await
            .unwrap();
        assert_eq!(response.message, "Nice diet!");
        assert_eq!(response.entry.calories(), Some(480.0));
        assert_eq!(response.entry.user_name(), profile.display_name);

        let stored = state.repo().find_entry(response.entry.id()).await.unwrap();
        assert_eq!(stored.calories(), Some(480.0));
    }

    #[tokio::test]
    async fn test_submit_with_failing_coach_still_logs() {
        let state = state_with(Arc::new(DisabledCoach)).await;
        with_profile(&state).await;

        let response = HabitService::submit_entry(&state, diet("Curry"), now())
            .await
            .unwrap();
        assert_eq!(response.message, ANALYSIS_FALLBACK);
        assert_eq!(response.entry.calories(), Some(0.0));
        assert_eq!(state.repo().entries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_rejects_kind_mismatch_before_storing() {
        let state = state_with(Arc::new(DisabledCoach)).await;
        with_profile(&state).await;

        let req = SubmitEntryRequest {
            kind: EntryKind::Exercise,
            content: "Run".to_string(),
            diet_tag: None,
            weight_kg: Some(70.0),
        };
        let err = HabitService::submit_entry(&state, req, now()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidEntryKind(_)));
        assert!(state.repo().entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_context_counts_new_exercise() {
        let coach = Arc::new(Recording::default());
        let state = state_with(coach.clone()).await;
        with_profile(&state).await;

        let run = SubmitEntryRequest {
            kind: EntryKind::Exercise,
            content: "Morning run".to_string(),
            diet_tag: None,
            weight_kg: None,
        };
        HabitService::submit_entry(&state, run.clone(), now()).await.unwrap();
        HabitService::submit_entry(&state, run, now()).await.unwrap();

        let contexts = coach.contexts.lock().unwrap();
        let counts: Vec<_> = contexts
            .iter()
            .map(|c| c.as_ref().unwrap().weekly_exercise_count)
            .collect();
        assert_eq!(counts, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_cheer_appends_encouragement() {
        let state = state_with(Arc::new(Recording::default())).await;
        with_profile(&state).await;
        let logged = HabitService::submit_entry(&state, diet("Salad"), now())
            .await
            .unwrap();

        let response = HabitService::cheer(&state, logged.entry.id()).await.unwrap();
        assert_eq!(response.encouragement.from_user_name, "Kenta");
        assert_eq!(response.encouragement.text, "Go Kenta! 🎉");
        assert_eq!(response.entry.encouragements().len(), 1);
    }

    #[tokio::test]
    async fn test_cheer_fallback_and_missing_entry() {
        let state = state_with(Arc::new(DisabledCoach)).await;
        with_profile(&state).await;

        let err = HabitService::cheer(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let logged = HabitService::submit_entry(&state, diet("Salad"), now())
            .await
            .unwrap();
        let response = HabitService::cheer(&state, logged.entry.id()).await.unwrap();
        assert_eq!(response.encouragement.text, CHEER_FALLBACK);
    }

    #[tokio::test]
    async fn test_feed_views() {
        let state = state_with(Arc::new(DisabledCoach)).await;
        with_profile(&state).await;
        HabitService::submit_entry(&state, diet("Salad"), now()).await.unwrap();
        let weigh_in = SubmitEntryRequest {
            kind: EntryKind::Weight,
            content: String::new(),
            diet_tag: None,
            weight_kg: Some(71.5),
        };
        HabitService::submit_entry(&state, weigh_in, now()).await.unwrap();

        let everyone = HabitService::feed(state.repo(), FeedView::Everyone).await;
        assert_eq!(everyone.entries.len(), 1);
        let mine = HabitService::feed(state.repo(), FeedView::Mine).await;
        assert_eq!(mine.entries.len(), 2);
        assert_eq!(mine.entries[0].kind(), EntryKind::Weight);
    }

    #[tokio::test]
    async fn test_feed_without_profile_shows_everyone() {
        let state = state_with(Arc::new(DisabledCoach)).await;
        let stranger = Entry::new(Uuid::new_v4(), "Saori", NewEntry::exercise("Yoga"), Utc::now())
            .unwrap();
        state.repo().prepend_entry(stranger.clone()).await.unwrap();

        let feed = HabitService::feed(state.repo(), FeedView::Mine).await;
        assert_eq!(feed.view, FeedView::Everyone);
        assert_eq!(feed.entries, vec![stranger]);
    }

    #[tokio::test]
    async fn test_dashboard_reflects_entries() {
        let state = state_with(Arc::new(Recording::default())).await;
        with_profile(&state).await;
        HabitService::submit_entry(&state, diet("Katsu don"), now()).await.unwrap();

        let dashboard = HabitService::dashboard(state.repo(), now()).await.unwrap();
        assert_eq!(dashboard.display_name, "Kenta");
        assert_eq!(dashboard.summary.calories_consumed, 480.0);
        assert_eq!(dashboard.summary.calories_remaining, 1620.0);
        assert_eq!(dashboard.summary.days_remaining, Some(20));
    }
}
