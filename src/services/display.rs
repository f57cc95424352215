//! Display collaborators receiving countdown updates

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::state::Phase;

/// A single display refresh: the formatted time plus a status line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayUpdate {
    pub formatted: String,
    pub status: String,
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub at: DateTime<Utc>,
}

impl DisplayUpdate {
    pub fn new(formatted: String, status: impl Into<String>, phase: Phase, remaining_seconds: u32) -> Self {
        Self {
            formatted,
            status: status.into(),
            phase,
            remaining_seconds,
            at: Utc::now(),
        }
    }

    /// The update shown before anything has been started
    pub fn ready() -> Self {
        Self::new("Ready".to_string(), "Ready", Phase::Idle, 0)
    }
}

/// Receiver of display updates, called on every state change
pub trait DisplaySink: Send {
    fn show(&mut self, update: &DisplayUpdate);
}

/// Publishes updates on a watch channel for readers elsewhere (HTTP, CLI)
#[derive(Debug)]
pub struct WatchDisplay {
    tx: watch::Sender<DisplayUpdate>,
}

impl WatchDisplay {
    pub fn channel() -> (Self, watch::Receiver<DisplayUpdate>) {
        let (tx, rx) = watch::channel(DisplayUpdate::ready());
        (Self { tx }, rx)
    }
}

impl DisplaySink for WatchDisplay {
    fn show(&mut self, update: &DisplayUpdate) {
        // send_replace keeps the latest value even when nobody is subscribed
        self.tx.send_replace(update.clone());
    }
}

/// Writes each update to the log at debug level
#[derive(Debug, Default)]
pub struct LogDisplay {
    name: String,
}

impl LogDisplay {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DisplaySink for LogDisplay {
    fn show(&mut self, update: &DisplayUpdate) {
        debug!("[{}] {} ({})", self.name, update.formatted, update.status);
    }
}

/// Redraws a single terminal line on stdout
#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl DisplaySink for TerminalDisplay {
    fn show(&mut self, update: &DisplayUpdate) {
        let mut out = std::io::stdout().lock();
        let line = format!("\r\x1b[2K{:>8}  {}", update.formatted, update.status);
        if let Err(e) = out.write_all(line.as_bytes()).and_then(|_| out.flush()) {
            warn!("Failed to draw countdown: {}", e);
        }
        if update.phase == Phase::Finished {
            let _ = writeln!(out);
        }
    }
}

/// Fans one update out to several sinks
#[derive(Default)]
pub struct MultiDisplay {
    sinks: Vec<Box<dyn DisplaySink>>,
}

impl MultiDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl DisplaySink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl DisplaySink for MultiDisplay {
    fn show(&mut self, update: &DisplayUpdate) {
        for sink in &mut self.sinks {
            sink.show(update);
        }
    }
}
