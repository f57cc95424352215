//! Collaborators the countdown controller talks to
//!
//! This module contains the display sinks, the persistence stores used to
//! remember the last entered value, and the completion notifiers.

pub mod display;
pub mod notifier;
pub mod persistence;

// Re-export main types
pub use display::{DisplaySink, DisplayUpdate, LogDisplay, MultiDisplay, TerminalDisplay, WatchDisplay};
pub use notifier::{BellNotifier, CommandNotifier, CompletionNotifier};
pub use persistence::{JsonFilePersistence, MemoryPersistence, Persistence};
