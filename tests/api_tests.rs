//! HTTP API behaviour, driven through the router without a socket

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use countdown_timer::{
    config::TimerSettings,
    controller::{ControllerOptions, ResetPolicy},
    create_router,
    state::AppState,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with(settings: TimerSettings) -> Router {
    create_router(Arc::new(AppState::new(20554, "127.0.0.1".to_string(), settings)))
}

fn app() -> Router {
    app_with(TimerSettings::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    read(app, request).await
}

async fn send_raw(app: &Router, uri: &str, content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    read(app, builder.body(Body::from(body)).unwrap()).await
}

async fn read(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn start_runs_a_countdown() {
    let app = app();
    let (status, body) = send(&app, "POST", "/timers/tea/start", Some(json!({"seconds": 75}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["phase"], "running");
    assert_eq!(body["timer"]["remaining_seconds"], 75);
    assert_eq!(body["timer"]["display"], "01:15");
    assert_eq!(body["timer"]["last_value"], 75);
}

#[tokio::test]
async fn start_accepts_numeric_strings() {
    let (status, body) = send(&app(), "POST", "/timers/tea/start", Some(json!({"seconds": "30"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["remaining_seconds"], 30);
}

#[tokio::test]
async fn start_rejects_bad_durations() {
    let app = app();
    for seconds in [json!(0), json!(-4), json!(3601), json!(2.5), json!("ten"), json!(null)] {
        let (status, body) = send(&app, "POST", "/timers/tea/start", Some(json!({ "seconds": seconds }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "seconds = {}", seconds);
        assert_eq!(body["error"], "invalid_input");
    }

    let (status, body) = send(&app, "POST", "/timers/tea/start", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (_, body) = send(&app, "POST", "/timers/tea/start", Some(json!({"seconds": 4000}))).await;
    assert_eq!(body["message"], "Maximum time limit is 3600 seconds (1 hour)");

    // Rejected starts never create the timer
    let (status, _) = send(&app, "GET", "/timers/tea", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unparseable_start_bodies_are_json_errors() {
    let app = app();
    let cases = [
        (Some("application/json"), "{not json"),
        (Some("application/json"), ""),
        (None, ""),
        (Some("text/plain"), "{\"seconds\": 5}"),
        (Some("application/json"), "[5]"),
    ];
    for (content_type, raw) in cases {
        let (status, body) = send_raw(&app, "/timers/tea/start", content_type, raw).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body = {:?}", raw);
        assert_eq!(body["error"], "invalid_input", "body = {:?}", raw);
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    let (_, body) = send(&app, "GET", "/status", None).await;
    assert_eq!(body["timers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unknown_timers_are_not_found() {
    let app = app();
    for i in 0..20 {
        let (status, body) = send(&app, "GET", &format!("/timers/ghost{}", i), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
    for action in ["pause", "resume", "reset"] {
        let (status, body) = send(&app, "POST", &format!("/timers/ghost/{}", action), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "action = {}", action);
        assert_eq!(body["error"], "not_found");
    }

    let (_, body) = send(&app, "GET", "/status", None).await;
    assert_eq!(body["timers"].as_array().unwrap().len(), 0);
    assert_eq!(body["last_action"], Value::Null);
}

#[tokio::test]
async fn pause_resume_cycle() {
    let app = app();
    send(&app, "POST", "/timers/tea/start", Some(json!({"seconds": 600}))).await;

    let (status, body) = send(&app, "POST", "/timers/tea/pause", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "paused");
    assert_eq!(body["timer"]["status"], "Paused");

    let (status, body) = send(&app, "POST", "/timers/tea/pause", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_state");
    assert_eq!(body["message"], "cannot pause a timer that is paused");

    let (status, body) = send(&app, "POST", "/timers/tea/resume", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "running");

    let (status, _) = send(&app, "POST", "/timers/tea/resume", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn pause_and_resume_on_idle_timer_conflict() {
    let app = app();
    send(&app, "POST", "/timers/fresh/start", Some(json!({"seconds": 30}))).await;
    send(&app, "POST", "/timers/fresh/reset", None).await;

    let (status, _) = send(&app, "POST", "/timers/fresh/pause", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "POST", "/timers/fresh/resume", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn reset_returns_to_idle() {
    let app = app();
    send(&app, "POST", "/timers/tea/start", Some(json!({"seconds": 45}))).await;

    let (status, body) = send(&app, "POST", "/timers/tea/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "idle");
    assert_eq!(body["timer"]["remaining_seconds"], 0);
    assert_eq!(body["timer"]["display"], "Ready");
}

#[tokio::test]
async fn reset_restores_last_value_from_state_dir() {
    let dir = tempfile::tempdir().unwrap();
    let settings = TimerSettings {
        options: ControllerOptions {
            reset_policy: ResetPolicy::RestoreLast,
            ..ControllerOptions::default()
        },
        state_dir: Some(dir.path().to_path_buf()),
        ..TimerSettings::default()
    };

    let app = app_with(settings.clone());
    send(&app, "POST", "/timers/tea/start", Some(json!({"seconds": 90}))).await;
    let (_, body) = send(&app, "POST", "/timers/tea/reset", None).await;
    assert_eq!(body["timer"]["remaining_seconds"], 90);
    assert_eq!(body["timer"]["display"], "01:30");
    assert!(dir.path().join("tea.json").exists());

    // A fresh server picks the value up again
    let restarted = app_with(settings);
    let (status, body) = send(&restarted, "GET", "/timers/tea", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "idle");
    assert_eq!(body["remaining_seconds"], 90);
    assert_eq!(body["last_value"], 90);
}

#[tokio::test]
async fn invalid_timer_names_are_rejected() {
    let (status, body) = send(&app(), "POST", "/timers/bad.name/start", Some(json!({"seconds": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_name");
}

#[tokio::test]
async fn status_lists_timers_and_last_action() {
    let app = app();
    send(&app, "POST", "/timers/b/start", Some(json!({"seconds": 10}))).await;
    send(&app, "POST", "/timers/a/start", Some(json!({"seconds": 20}))).await;
    send(&app, "POST", "/timers/a/pause", None).await;

    let (status, body) = send(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["port"], 20554);
    assert_eq!(body["last_action"], "pause a");

    let timers = body["timers"].as_array().unwrap();
    assert_eq!(timers.len(), 2);
    assert_eq!(timers[0]["name"], "a");
    assert_eq!(timers[0]["phase"], "paused");
    assert_eq!(timers[1]["name"], "b");
    assert_eq!(timers[1]["phase"], "running");
}
