//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    error::ControlError,
    format::{seconds_from_json, validate_seconds},
    state::{AppState, TimerSnapshot},
};
use super::responses::{ApiError, ApiResponse, HealthResponse, StartRequest, StatusResponse};

/// Handle POST /timers/:name/start - Start or restart a countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    request: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(request) = request.map_err(|rejection| {
        warn!("Rejected start body for timer '{}': {}", name, rejection.body_text());
        ApiError::new(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text())
    })?;

    // Validate before the timer is created, so bad input never adds one
    let seconds = seconds_from_json(&request.seconds)
        .and_then(validate_seconds)
        .map_err(|e| {
            warn!("Failed to start timer '{}': {}", name, e);
            ApiError::from(e)
        })?;

    let snapshot = state
        .apply_or_create(&name, "start", |timer| timer.start(i64::from(seconds)))
        .map_err(|e| {
            warn!("Failed to start timer '{}': {}", name, e);
            ApiError::from(e)
        })?;

    info!("Start endpoint called - timer '{}' running", name);
    Ok(Json(ApiResponse::new(
        format!("Countdown started for {} seconds", snapshot.initial_seconds),
        snapshot,
    )))
}

/// Handle POST /timers/:name/pause - Pause a running countdown
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let snapshot = state.apply(&name, "pause", |timer| timer.pause()).map_err(|e| {
        warn!("Failed to pause timer '{}': {}", name, e);
        ApiError::from(e)
    })?;

    info!("Pause endpoint called - timer '{}' paused", name);
    Ok(Json(ApiResponse::new("Countdown paused".to_string(), snapshot)))
}

/// Handle POST /timers/:name/resume - Resume a paused countdown
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let snapshot = state.apply(&name, "resume", |timer| timer.resume()).map_err(|e| {
        warn!("Failed to resume timer '{}': {}", name, e);
        ApiError::from(e)
    })?;

    info!("Resume endpoint called - timer '{}' running", name);
    Ok(Json(ApiResponse::new("Countdown resumed".to_string(), snapshot)))
}

/// Handle POST /timers/:name/reset - Return a timer to idle
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let snapshot = state
        .apply(&name, "reset", |timer| {
            timer.reset();
            Ok(())
        })
        .map_err(|e| {
            error!("Failed to reset timer '{}': {}", name, e);
            ApiError::from(e)
        })?;

    info!("Reset endpoint called - timer '{}' idle", name);
    Ok(Json(ApiResponse::new("Countdown reset".to_string(), snapshot)))
}

/// Handle GET /timers/:name - Current state of one timer
pub async fn timer_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    let handle = state
        .get(&name)?
        .ok_or_else(|| ControlError::NotFound(name.clone()))?;
    let snapshot = handle.snapshot().map_err(|e| {
        error!("Failed to read timer '{}': {}", name, e);
        ApiError::internal(e)
    })?;
    Ok(Json(snapshot))
}

/// Handle GET /status - Return every timer plus server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let timers = match state.snapshots() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to collect timer snapshots: {}", e);
            return Err(ApiError::internal(e));
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timers,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
