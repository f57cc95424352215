//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    controller::{ControllerOptions, ResetPolicy},
    services::{BellNotifier, CommandNotifier, CompletionNotifier},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "countdown-timer")]
#[command(about = "A countdown timer service with pause, resume and reset")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory for remembering the last value of each timer (in memory if unset)
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Restore the last entered value on reset instead of clearing to zero
    #[arg(long)]
    pub restore_last: bool,

    /// Remaining-seconds marks that get a warning status
    #[arg(long, value_delimiter = ',', default_values_t = vec![10, 5])]
    pub warn_at: Vec<u32>,

    /// Do not ring the terminal bell when a countdown finishes
    #[arg(long)]
    pub silent: bool,

    /// Shell command to run when a countdown finishes
    #[arg(long)]
    pub on_complete: Option<String>,

    /// Run a single countdown of this many seconds in the terminal and exit
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub run: Option<i64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Settings applied to every timer this process creates
    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            options: ControllerOptions {
                period: Duration::from_secs(1),
                warn_at: self.warn_at.clone(),
                reset_policy: if self.restore_last {
                    ResetPolicy::RestoreLast
                } else {
                    ResetPolicy::Zero
                },
            },
            state_dir: self.state_dir.clone(),
            bell: !self.silent,
            on_complete: self.on_complete.clone(),
        }
    }
}

/// Per-timer settings derived from the command line
#[derive(Debug, Clone, Default)]
pub struct TimerSettings {
    pub options: ControllerOptions,
    pub state_dir: Option<PathBuf>,
    pub bell: bool,
    pub on_complete: Option<String>,
}

impl TimerSettings {
    /// Build the completion notifiers these settings ask for
    pub fn notifiers(&self) -> Vec<Box<dyn CompletionNotifier>> {
        let mut notifiers: Vec<Box<dyn CompletionNotifier>> = Vec::new();
        if self.bell {
            notifiers.push(Box::new(BellNotifier));
        }
        if let Some(command) = &self.on_complete {
            notifiers.push(Box::new(CommandNotifier::new(command.clone())));
        }
        notifiers
    }
}
