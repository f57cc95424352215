//! Countdown Timer - a countdown service with pause, resume and reset
//!
//! This library provides a countdown controller driven by a once-per-second
//! tick, the display/persistence/notification collaborators around it, and an
//! HTTP server hosting any number of independent named timers.

pub mod config;
pub mod error;
pub mod format;
pub mod controller;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, TimerSettings};
pub use controller::{ControllerOptions, CountdownController, ResetPolicy};
pub use error::TimerError;
pub use format::format_duration;
pub use state::{AppState, Phase, TimerState};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
