//! Background tasks module
//! 
//! This module contains the tasks that feed scheduler ticks into controllers
//! and the one-shot terminal countdown.

pub mod countdown_driver;

// Re-export main functions
pub use countdown_driver::{countdown_driver_task, run_countdown};
