//! Intent API tests driven through the router

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

use tomato_timer::api::create_router;
use tomato_timer::state::AppState;
use tomato_timer::storage::StateStore;
use tomato_timer::timer::TimerMachine;

fn test_app() -> (Router, Arc<AppState>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    let state = Arc::new(AppState::new(TimerMachine::new(Utc::now()), store));
    (create_router(Arc::clone(&state)), state, dir)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn get_state_returns_full_snapshot() {
    let (router, _state, _dir) = test_app();
    let (status, body) = send(&router, Method::GET, "/state", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentPhase"], "init");
    assert_eq!(body["isActive"], false);
    assert_eq!(body["settings"]["workMinutes"], 25);
    assert_eq!(body["progress"]["totalPercent"], 0.0);
    assert_eq!(body["clock"]["history"][0]["phase"], "init");
}

#[tokio::test]
async fn toggle_starts_the_run_and_responds_with_snapshot() {
    let (router, _state, _dir) = test_app();
    let (status, body) = send(&router, Method::POST, "/toggle", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentPhase"], "work");
    assert_eq!(body["isActive"], true);
    assert!(body["clock"]["startTime"].is_string());
    assert!(body["clock"]["endTime"].is_string());
    assert_eq!(body["clock"]["history"][1]["action"], "Start");
}

#[tokio::test]
async fn toggle_twice_pauses_without_losing_progress() {
    let (router, _state, _dir) = test_app();
    send(&router, Method::POST, "/toggle", None).await;
    let (_, body) = send(&router, Method::POST, "/toggle", None).await;

    assert_eq!(body["isActive"], false);
    assert_eq!(body["currentPhase"], "work");
    assert_eq!(body["clock"]["history"][2]["action"], "Paused");
}

#[tokio::test]
async fn settings_update_clamps_and_ignores_junk() {
    let (router, _state, _dir) = test_app();
    let (status, body) = send(
        &router,
        Method::POST,
        "/settings",
        Some(json!({
            "workMinutes": 30,
            "cyclesPerSession": 0,
            "shortBreakMinutes": "five",
            "unexpected": true,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["workMinutes"], 30);
    // Zero clamps to the floor, junk is ignored
    assert_eq!(body["settings"]["cyclesPerSession"], 1);
    assert_eq!(body["settings"]["shortBreakMinutes"], 5);
}

#[tokio::test]
async fn settings_update_is_ignored_while_running() {
    let (router, _state, _dir) = test_app();
    send(&router, Method::POST, "/toggle", None).await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/settings",
        Some(json!({ "workMinutes": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["workMinutes"], 25);
}

#[tokio::test]
async fn delete_state_resets_run_and_clears_storage() {
    let (router, _state, dir) = test_app();
    send(&router, Method::POST, "/toggle", None).await;
    assert!(dir.path().join("state.json").exists());

    let (status, body) = send(&router, Method::DELETE, "/state", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentPhase"], "init");
    assert_eq!(body["isActive"], false);
    assert_eq!(body["settings"]["workMinutes"], 25);
    assert_eq!(body["clock"]["totalSeconds"], 0);

    // No record is left behind until the next change commits
    assert!(!dir.path().join("state.json").exists());
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (router, _state, _dir) = test_app();
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_intent_routes_fall_through() {
    let (router, _state, _dir) = test_app();
    let (status, _) = send(&router, Method::POST, "/nonsense", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn every_committed_snapshot_is_broadcast() {
    let (router, state, _dir) = test_app();
    let mut rx = state.subscribe();

    send(&router, Method::POST, "/toggle", None).await;
    let first = rx.recv().await.unwrap();
    assert!(first.is_active);

    send(&router, Method::POST, "/toggle", None).await;
    let second = rx.recv().await.unwrap();
    assert!(!second.is_active);
}
