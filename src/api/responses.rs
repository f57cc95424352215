//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{ControlError, TimerError},
    state::TimerSnapshot,
};

/// Request body for POST /timers/:name/start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    /// Left as raw JSON so that non-integers surface as invalid input
    #[serde(default)]
    pub seconds: Value,
}

/// API response structure for timer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: timer.phase.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Status response listing every timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timers: Vec<TimerSnapshot>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body returned with every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Handler failure, rendered as a status code plus [`ErrorResponse`]
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl From<TimerError> for ApiError {
    fn from(e: TimerError) -> Self {
        let status = match e {
            TimerError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            TimerError::InvalidState { .. } => StatusCode::CONFLICT,
        };
        Self::new(status, e.kind(), e.to_string())
    }
}

impl From<ControlError> for ApiError {
    fn from(e: ControlError) -> Self {
        let message = e.to_string();
        match e {
            ControlError::Timer(e) => e.into(),
            ControlError::InvalidName(_) => Self::new(StatusCode::BAD_REQUEST, "invalid_name", message),
            ControlError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "not_found", message),
            ControlError::Internal(_) => Self::internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
