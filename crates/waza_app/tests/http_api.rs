mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use std::sync::Arc;
use support::{MealStoreMock, ScriptedNutrientLookup, banana_fact, day, meal_of};
use tower::ServiceExt;
use waza_app::http::{AppState, build_router};

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

fn router_with(store: MealStoreMock, nutrients: ScriptedNutrientLookup) -> axum::Router {
    let state = Arc::new(AppState::new(Arc::new(store), Arc::new(nutrients), None));
    build_router(state)
}

#[tokio::test]
async fn health_answers_ok() {
    let app = router_with(MealStoreMock::default(), ScriptedNutrientLookup::default());
    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn dashboard_macros_round_trip() {
    let store = MealStoreMock {
        by_date: [(day("2026-03-02"), meal_of("banana"))].into(),
        ..Default::default()
    };
    let nutrients = ScriptedNutrientLookup::default();
    nutrients.script("banana", None, vec![banana_fact()]).await;

    let app = router_with(store, nutrients);
    let resp = app
        .oneshot(
            Request::get("/api/dashboard/macros?warrior_id=w1&date=2026-03-02")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["calories"], 200.0);
    assert_eq!(body["protein_kcal"], 8.0);
    assert_eq!(body["carbs_kcal"], 120.0);
    assert_eq!(body["fats_kcal"], 9.0);
}

#[tokio::test]
async fn dashboard_macros_rejects_bad_date() {
    let app = router_with(MealStoreMock::default(), ScriptedNutrientLookup::default());
    let resp = app
        .oneshot(
            Request::get("/api/dashboard/macros?warrior_id=w1&date=tomorrowish")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_resolution_returns_warrior() {
    let app = router_with(MealStoreMock::default(), ScriptedNutrientLookup::default());
    let resp = app
        .oneshot(
            Request::get("/api/profile?user_id=u1&user_type=Waza%20Warrior")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["user_type"], "Waza Warrior");
    assert_eq!(body["warrior"]["warrior_id"], "w1");
}

#[tokio::test]
async fn missing_trainer_profile_is_404_with_completion_redirect() {
    let app = router_with(MealStoreMock::default(), ScriptedNutrientLookup::default());
    let resp = app
        .oneshot(
            Request::get("/api/profile?user_id=u9&user_type=Waza%20Trainer")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["redirect"], "/completeProfile/wazaTrainer/u9");
}

#[tokio::test]
async fn create_user_validates_then_creates() {
    let app = router_with(MealStoreMock::default(), ScriptedNutrientLookup::default());

    let bad = serde_json::json!({
        "username": "waleed",
        "email": "not-an-email",
        "password": "Str0ng!pass",
        "user_type": "Waza Warrior"
    });
    let resp = app
        .clone()
        .oneshot(
            Request::post("/api/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(bad.to_string()))
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let good = serde_json::json!({
        "username": "waleed",
        "email": "waleed@example.com",
        "password": "Str0ng!pass",
        "user_type": "Waza Warrior"
    });
    let resp = app
        .oneshot(
            Request::post("/api/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(good.to_string()))
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["username"], "waleed");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn create_exercise_rejects_zero_sets() {
    let app = router_with(MealStoreMock::default(), ScriptedNutrientLookup::default());
    let draft = serde_json::json!({
        "title": "Bench Press",
        "muscle_group": "Chest",
        "weight": 60.0,
        "sets": 0,
        "reps": 8,
        "session_id": "s1"
    });
    let resp = app
        .oneshot(
            Request::post("/api/warrior/exercise")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(draft.to_string()))
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn trainers_listing_returns_cards() {
    let app = router_with(MealStoreMock::default(), ScriptedNutrientLookup::default());
    let resp = app
        .oneshot(Request::get("/api/trainers").body(Body::empty()).unwrap())
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body[0]["specialization_summary"], "Strength, Mobility");
    assert_eq!(body[0]["rate_summary"], "$55/hr");
}
