//! State management module
//! 
//! This module contains the countdown data model and the shared registry of
//! named timers used by the HTTP server.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, SharedController, TimerHandle};
pub use timer_state::{Phase, TimerSnapshot, TimerState};
