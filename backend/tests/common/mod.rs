//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory store and a scripted coach,
//! so the HTTP surface can be driven without Redis or network access.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use habit_coach_backend::coach::{
    AnalysisRequest, CheerRequest, CoachError, CoachFeedback, CoachService, CoachingCollaborator,
};
use habit_coach_backend::config::AppConfig;
use habit_coach_backend::repositories::{HabitRepository, SnapshotKeys};
use habit_coach_backend::storage::{MemoryStore, SnapshotStore};
use habit_coach_backend::{routes, state::AppState};
use habit_coach_shared::EntryKind;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Estimate the scripted coach gives for every meal
pub const MEAL_KCAL: f64 = 520.0;

/// Coach with fixed answers
pub struct ScriptedCoach;

#[async_trait]
impl CoachingCollaborator for ScriptedCoach {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<CoachFeedback, CoachError> {
        Ok(CoachFeedback {
            message: format!("Great {} log!", request.entry.kind()),
            estimated_calories: (request.entry.kind() == EntryKind::Diet).then_some(MEAL_KCAL),
        })
    }

    async fn cheer(&self, request: &CheerRequest) -> Result<String, CoachError> {
        Ok(format!("Go {}! 🎉", request.entry.user_name()))
    }
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// Empty store, scripted coach
    pub async fn new() -> Self {
        Self::build(Arc::new(MemoryStore::new()), Arc::new(ScriptedCoach), false).await
    }

    /// Empty store with a custom coach
    pub async fn with_coach(coach: Arc<dyn CoachingCollaborator>) -> Self {
        Self::build(Arc::new(MemoryStore::new()), coach, false).await
    }

    /// Pre-populated store
    pub async fn with_store(store: MemoryStore, seed_demo: bool) -> Self {
        Self::build(Arc::new(store), Arc::new(ScriptedCoach), seed_demo).await
    }

    async fn build(
        store: Arc<MemoryStore>,
        coach: Arc<dyn CoachingCollaborator>,
        seed_demo: bool,
    ) -> Self {
        let dyn_store: Arc<dyn SnapshotStore> = store.clone();
        let repo = HabitRepository::load(dyn_store, SnapshotKeys::default(), seed_demo)
            .await
            .expect("Failed to load repository");

        let coach = CoachService::new(coach, Duration::from_secs(5));
        let state = AppState::new(Arc::new(repo), coach, test_config());
        let app = routes::create_router(state);

        Self { app, store }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        self.send_json("POST", path, body).await
    }

    /// Make a PUT request with JSON body
    pub async fn put(&self, path: &str, body: &str) -> (StatusCode, String) {
        self.send_json("PUT", path, body).await
    }

    /// Save a complete profile (female, 30, 165 cm, 60 kg, sedentary, lose)
    pub async fn create_profile(&self, name: &str) -> Value {
        let body = json!({
            "display_name": name,
            "height_cm": 165.0,
            "current_weight_kg": 60.0,
            "age": 30,
            "gender": "female",
            "activity_level": "sedentary",
            "goal_mode": "lose"
        });
        let (status, response) = self.put("/api/v1/profile", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK, "profile save failed: {response}");
        serde_json::from_str(&response).unwrap()
    }

    /// Log an entry and return the parsed response
    pub async fn log(&self, body: Value) -> Value {
        let (status, response) = self.post("/api/v1/entries", &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "entry submit failed: {response}");
        serde_json::from_str(&response).unwrap()
    }

    async fn send_json(&self, method: &str, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }
}

pub fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.storage.backend = habit_coach_backend::config::StorageBackend::Memory;
    config
}
