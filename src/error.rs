//! Error types shared by the controller and its collaborators

use thiserror::Error;

use crate::state::Phase;

/// Errors reported synchronously by countdown operations.
///
/// Neither kind is fatal: the controller state is left exactly as it was
/// before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// The requested duration was out of range, not a number, or not whole
    #[error("{reason}")]
    InvalidInput { input: String, reason: &'static str },

    /// The operation is not allowed in the current phase
    #[error("cannot {operation} a timer that is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },
}

impl TimerError {
    pub(crate) fn invalid_input(input: impl ToString, reason: &'static str) -> Self {
        Self::InvalidInput {
            input: input.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid_state(operation: &'static str, phase: Phase) -> Self {
        Self::InvalidState { operation, phase }
    }

    /// Short machine-readable kind, used by the HTTP layer
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::InvalidState { .. } => "invalid_state",
        }
    }
}

/// Failure to remember the last entered value
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a best-effort completion side effect
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("no async runtime available to run the completion command")]
    NoRuntime,
}

/// Failure of an operation addressed to a named timer
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("invalid timer name {0:?}: use 1-64 letters, digits, '-' or '_'")]
    InvalidName(String),

    #[error("no timer named {0:?}; start it first")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}
