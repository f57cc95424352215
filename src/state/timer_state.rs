//! Timer state structure and management

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::MAX_SECONDS;

/// Lifecycle phase of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Countdown state owned by a single controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Duration the current countdown was started with
    pub initial_seconds: u32,
    /// Seconds left before completion
    pub remaining_seconds: u32,
    pub phase: Phase,
}

impl TimerState {
    /// Create a new idle timer state with nothing on the clock
    pub fn new() -> Self {
        Self {
            initial_seconds: 0,
            remaining_seconds: 0,
            phase: Phase::Idle,
        }
    }

    /// Create an idle timer state preloaded with a remembered value
    pub fn restored(seconds: u32) -> Self {
        Self {
            initial_seconds: seconds,
            remaining_seconds: seconds,
            phase: Phase::Idle,
        }
    }

    /// Check the data model invariants.
    ///
    /// `0 <= remaining <= initial <= 3600`, and a finished countdown has
    /// nothing left.
    pub fn is_consistent(&self) -> bool {
        let bounded = self.remaining_seconds <= self.initial_seconds
            && i64::from(self.initial_seconds) <= MAX_SECONDS;
        let finished_at_zero = self.phase != Phase::Finished || self.remaining_seconds == 0;
        bounded && finished_at_zero
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable view of a named timer, as reported by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub name: String,
    pub phase: Phase,
    pub initial_seconds: u32,
    pub remaining_seconds: u32,
    /// Text most recently pushed to the display
    pub display: String,
    /// Status message most recently pushed to the display
    pub status: String,
    /// Last value remembered by the persistence collaborator
    pub last_value: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_idle_and_empty() {
        let state = TimerState::new();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.remaining_seconds, 0);
        assert!(state.is_consistent());
    }

    #[test]
    fn detects_broken_invariants() {
        let mut state = TimerState::restored(10);
        assert!(state.is_consistent());

        state.remaining_seconds = 11;
        assert!(!state.is_consistent());

        state.remaining_seconds = 3;
        state.phase = Phase::Finished;
        assert!(!state.is_consistent());
    }

    #[test]
    fn phase_serializes_lowercase() {
        let json = serde_json::to_string(&Phase::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
        assert_eq!(Phase::Running.to_string(), "running");
    }
}
