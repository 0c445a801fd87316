//! Integration tests for entry, cheer and dashboard endpoints

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use habit_coach_backend::coach::{DisabledCoach, ANALYSIS_FALLBACK, CHEER_FALLBACK};
use habit_coach_backend::storage::MemoryStore;
use serde_json::json;

fn lunch(content: &str) -> serde_json::Value {
    json!({ "kind": "diet", "content": content, "diet_tag": "lunch" })
}

#[tokio::test]
async fn test_submit_requires_profile() {
    let app = common::TestApp::new().await;

    let (status, body) = app.post("/api/v1/entries", &lunch("Soba").to_string()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(common::parse(&body)["error"]["code"], "PROFILE_REQUIRED");
}

#[tokio::test]
async fn test_submit_diet_fills_calories() {
    let app = common::TestApp::new().await;
    app.create_profile("Saori").await;

    let response = app.log(lunch("Soba with tempura")).await;

    assert_eq!(response["message"], "Great diet log!");
    assert_eq!(response["entry"]["calories"], common::MEAL_KCAL);
    assert_eq!(response["entry"]["user_name"], "Saori");
    assert_eq!(response["entry"]["diet_tag"], "lunch");

    let (_, dashboard) = app.get("/api/v1/dashboard").await;
    let dashboard = common::parse(&dashboard);
    assert_eq!(dashboard["summary"]["calories_consumed"], common::MEAL_KCAL);
    assert_eq!(dashboard["summary"]["calories_remaining"], 1084.0 - common::MEAL_KCAL);
}

#[tokio::test]
async fn test_submit_with_unavailable_coach() {
    let app = common::TestApp::with_coach(Arc::new(DisabledCoach)).await;
    app.create_profile("Saori").await;

    let response = app
        .log(json!({ "kind": "exercise", "content": "Morning run" }))
        .await;

    assert_eq!(response["message"], ANALYSIS_FALLBACK);
    assert_eq!(response["entry"]["calories"], 0.0);

    let (_, feed) = app.get("/api/v1/entries").await;
    assert_eq!(common::parse(&feed)["entries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_weight_entry_requires_weight() {
    let app = common::TestApp::new().await;
    app.create_profile("Saori").await;

    let (status, body) = app
        .post("/api/v1/entries", &json!({ "kind": "weight" }).to_string())
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(common::parse(&body)["error"]["code"], "INVALID_ENTRY_KIND");
}

#[tokio::test]
async fn test_weight_out_of_range() {
    let app = common::TestApp::new().await;
    app.create_profile("Saori").await;

    let body = json!({ "kind": "weight", "weight_kg": 700.0 });
    let (status, response) = app.post("/api/v1/entries", &body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(common::parse(&response)["error"]["field"], "weight_kg");
}

#[tokio::test]
async fn test_feed_hides_weigh_ins_from_everyone() {
    let app = common::TestApp::new().await;
    app.create_profile("Saori").await;
    app.log(lunch("Salad")).await;
    app.log(json!({ "kind": "weight", "weight_kg": 59.2 })).await;

    let (status, everyone) = app.get("/api/v1/entries").await;
    assert_eq!(status, StatusCode::OK);
    let everyone = common::parse(&everyone);
    assert_eq!(everyone["view"], "everyone");
    assert_eq!(everyone["entries"].as_array().unwrap().len(), 1);

    let (_, mine) = app.get("/api/v1/entries?view=mine").await;
    let mine = common::parse(&mine);
    let entries = mine["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["kind"], "weight");
    assert_eq!(entries[0]["content"], "Weighed in");
}

#[tokio::test]
async fn test_demo_seed_visible_to_everyone() {
    let app = common::TestApp::with_store(MemoryStore::new(), true).await;
    app.create_profile("Saori").await;

    let (_, everyone) = app.get("/api/v1/entries").await;
    let everyone = common::parse(&everyone);
    assert_eq!(everyone["entries"].as_array().unwrap().len(), 3);
    assert_eq!(everyone["entries"][0]["user_name"], "Kenta");

    let (_, mine) = app.get("/api/v1/entries?view=mine").await;
    assert!(common::parse(&mine)["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cheer_appends_encouragement() {
    let app = common::TestApp::new().await;
    app.create_profile("Saori").await;
    let logged = app.log(lunch("Onigiri")).await;
    let id = logged["entry"]["id"].as_str().unwrap();

    let (status, body) = app.post(&format!("/api/v1/entries/{id}/cheers"), "").await;

    assert_eq!(status, StatusCode::CREATED);
    let body = common::parse(&body);
    assert_eq!(body["encouragement"]["from_user_name"], "Saori");
    assert_eq!(body["encouragement"]["text"], "Go Saori! 🎉");
    assert_eq!(body["entry"]["encouragements"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cheer_fallback_with_unavailable_coach() {
    let app = common::TestApp::with_coach(Arc::new(DisabledCoach)).await;
    app.create_profile("Saori").await;
    let logged = app.log(lunch("Onigiri")).await;
    let id = logged["entry"]["id"].as_str().unwrap();

    let (_, body) = app.post(&format!("/api/v1/entries/{id}/cheers"), "").await;

    assert_eq!(common::parse(&body)["encouragement"]["text"], CHEER_FALLBACK);
}

#[tokio::test]
async fn test_cheer_unknown_entry() {
    let app = common::TestApp::new().await;
    app.create_profile("Saori").await;

    let path = format!("/api/v1/entries/{}/cheers", uuid::Uuid::new_v4());
    let (status, _) = app.post(&path, "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post("/api/v1/entries/not-a-uuid/cheers", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_storage_failure_keeps_log_unchanged() {
    let app = common::TestApp::new().await;
    app.create_profile("Saori").await;
    app.store.set_fail_writes(true);

    let (status, body) = app.post("/api/v1/entries", &lunch("Ramen").to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(common::parse(&body)["error"]["code"], "STORAGE_ERROR");
    let (_, feed) = app.get("/api/v1/entries").await;
    assert!(common::parse(&feed)["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_goal_progress() {
    let app = common::TestApp::new().await;
    app.create_profile("Saori").await;
    let goal = json!({
        "description": "Lose 3kg",
        "deadline": (Utc::now() + Duration::days(10)).timestamp_millis(),
        "weekly_exercise_target": 3,
        "target_weight_kg": 57.0
    });
    app.put("/api/v1/profile/goal", &goal.to_string()).await;
    app.log(json!({ "kind": "exercise", "content": "Swim" })).await;
    app.log(json!({ "kind": "weight", "weight_kg": 58.5 })).await;

    let (status, body) = app.get("/api/v1/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    let summary = &common::parse(&body)["summary"];
    assert_eq!(summary["weekly_exercise_count"], 1);
    assert_eq!(summary["weekly_exercise_target"], 3);
    assert_eq!(summary["current_weight_kg"], 58.5);
    assert_eq!(summary["weight_progress"]["percent"], 50.0);
    assert_eq!(summary["days_remaining"], 10);
}
