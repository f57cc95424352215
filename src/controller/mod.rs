//! Countdown controller
//!
//! A four-phase state machine (idle, running, paused, finished) driven by a
//! once-per-second tick from a [`Scheduler`].

pub mod scheduler;

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    error::TimerError,
    format::{format_duration, parse_seconds, validate_seconds},
    services::{CompletionNotifier, DisplaySink, DisplayUpdate, Persistence},
    state::{Phase, TimerSnapshot, TimerState},
};

pub use scheduler::{ManualScheduler, Scheduler, TickEvent, TickRegistration, TokioScheduler};

/// What `reset()` leaves on the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPolicy {
    /// Clear back to zero
    #[default]
    Zero,
    /// Put the last remembered value back
    RestoreLast,
}

/// Tunables for a controller
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Tick period, one second outside of tests
    pub period: Duration,
    /// Remaining-seconds marks that get a warning status message
    pub warn_at: Vec<u32>,
    pub reset_policy: ResetPolicy,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            warn_at: vec![10, 5],
            reset_policy: ResetPolicy::Zero,
        }
    }
}

/// Owns one countdown and its tick registration
pub struct CountdownController {
    name: String,
    state: TimerState,
    /// Present exactly while the phase is `Running`
    registration: Option<TickRegistration>,
    next_epoch: u64,
    last_update: DisplayUpdate,
    options: ControllerOptions,
    scheduler: Box<dyn Scheduler>,
    display: Box<dyn DisplaySink>,
    persistence: Option<Box<dyn Persistence>>,
    /// Read from `persistence` once when attached, then kept in step with saves
    last_value: Option<u32>,
    notifiers: Vec<Box<dyn CompletionNotifier>>,
}

impl CountdownController {
    /// Create an idle controller with no persistence and no notifiers
    pub fn new(
        name: impl Into<String>,
        scheduler: impl Scheduler + 'static,
        display: impl DisplaySink + 'static,
    ) -> Self {
        let mut controller = Self {
            name: name.into(),
            state: TimerState::new(),
            registration: None,
            next_epoch: 0,
            last_update: DisplayUpdate::ready(),
            options: ControllerOptions::default(),
            scheduler: Box::new(scheduler),
            display: Box::new(display),
            persistence: None,
            last_value: None,
            notifiers: Vec::new(),
        };
        controller.show_idle("Ready");
        controller
    }

    /// Attach a store for the last entered value.
    ///
    /// Under [`ResetPolicy::RestoreLast`] an idle controller is seeded from it.
    pub fn with_persistence(mut self, persistence: impl Persistence + 'static) -> Self {
        self.last_value = persistence.load();
        self.persistence = Some(Box::new(persistence));
        self.restore_if_idle();
        self
    }

    pub fn with_notifier(mut self, notifier: impl CompletionNotifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }

    pub fn with_boxed_notifier(mut self, notifier: Box<dyn CompletionNotifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn with_options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self.restore_if_idle();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn has_registration(&self) -> bool {
        self.registration.is_some()
    }

    /// Last value remembered by the persistence collaborator, if any
    pub fn last_value(&self) -> Option<u32> {
        self.last_value
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            name: self.name.clone(),
            phase: self.state.phase,
            initial_seconds: self.state.initial_seconds,
            remaining_seconds: self.state.remaining_seconds,
            display: self.last_update.formatted.clone(),
            status: self.last_update.status.clone(),
            last_value: self.last_value(),
        }
    }

    /// Start (or restart) a countdown of `requested` seconds
    pub fn start(&mut self, requested: i64) -> Result<(), TimerError> {
        let seconds = validate_seconds(requested)?;

        self.cancel_registration();
        self.state = TimerState {
            initial_seconds: seconds,
            remaining_seconds: seconds,
            phase: Phase::Running,
        };
        self.register();

        if let Some(persistence) = self.persistence.as_mut() {
            match persistence.save(seconds) {
                Ok(()) => self.last_value = Some(seconds),
                Err(e) => warn!("[{}] Failed to remember last value: {}", self.name, e),
            }
        }

        info!("[{}] Countdown started for {} seconds", self.name, seconds);
        self.show_remaining("Running");
        self.check_invariants();
        Ok(())
    }

    /// Start from raw user text, rejecting anything that is not a whole number
    pub fn start_input(&mut self, raw: &str) -> Result<(), TimerError> {
        let requested = parse_seconds(raw)?;
        self.start(requested)
    }

    /// Advance the countdown by one second. Does nothing unless running.
    pub fn tick(&mut self) {
        if self.state.phase != Phase::Running {
            debug!("[{}] Ignoring tick while {}", self.name, self.state.phase);
            return;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        let remaining = self.state.remaining_seconds;

        if remaining > 0 {
            if self.options.warn_at.contains(&remaining) {
                let status = format!("{} seconds remaining", remaining);
                debug!("[{}] {}", self.name, status);
                self.show_remaining(status);
            } else {
                self.show_remaining("Running");
            }
        } else {
            self.cancel_registration();
            self.state.phase = Phase::Finished;
            info!("[{}] Countdown finished", self.name);
            self.show_remaining("Completed");

            for notifier in &self.notifiers {
                if let Err(e) = notifier.notify(&self.name) {
                    debug!("[{}] Completion notifier failed: {}", self.name, e);
                }
            }
        }

        self.check_invariants();
    }

    /// Hand a scheduler tick to the controller.
    ///
    /// Ticks from a registration that has since been cancelled are dropped.
    pub fn deliver(&mut self, event: TickEvent) {
        let live_epoch = self.registration.as_ref().map(TickRegistration::epoch);
        if live_epoch == Some(event.epoch) {
            self.tick();
        } else {
            debug!("[{}] Dropping stale tick from registration {}", self.name, event.epoch);
        }
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        if self.state.phase != Phase::Running {
            return Err(TimerError::invalid_state("pause", self.state.phase));
        }

        self.cancel_registration();
        self.state.phase = Phase::Paused;
        info!("[{}] Countdown paused at {} seconds", self.name, self.state.remaining_seconds);
        self.show_remaining("Paused");
        self.check_invariants();
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TimerError> {
        if self.state.phase != Phase::Paused {
            return Err(TimerError::invalid_state("resume", self.state.phase));
        }

        self.state.phase = Phase::Running;
        self.register();
        info!("[{}] Countdown resumed at {} seconds", self.name, self.state.remaining_seconds);
        self.show_remaining("Running");
        self.check_invariants();
        Ok(())
    }

    /// Stop whatever is happening and go back to idle
    pub fn reset(&mut self) {
        self.cancel_registration();

        self.state = match self.options.reset_policy {
            ResetPolicy::Zero => TimerState::new(),
            ResetPolicy::RestoreLast => self
                .last_value()
                .map(TimerState::restored)
                .unwrap_or_default(),
        };

        info!("[{}] Countdown reset", self.name);
        self.show_idle("Reset");
        self.check_invariants();
    }

    fn restore_if_idle(&mut self) {
        if self.state.phase != Phase::Idle || self.options.reset_policy != ResetPolicy::RestoreLast {
            return;
        }
        if let Some(seconds) = self.last_value() {
            debug!("[{}] Restored last value {}", self.name, seconds);
            self.state = TimerState::restored(seconds);
            self.show_idle("Ready");
        }
    }

    fn register(&mut self) {
        self.next_epoch += 1;
        let registration = self.scheduler.register(self.next_epoch, self.options.period);
        self.registration = Some(registration);
    }

    fn cancel_registration(&mut self) {
        if let Some(mut registration) = self.registration.take() {
            registration.cancel();
        }
    }

    fn show_remaining(&mut self, status: impl Into<String>) {
        let remaining = self.state.remaining_seconds;
        let update = DisplayUpdate::new(
            format_duration(i64::from(remaining)),
            status,
            self.state.phase,
            remaining,
        );
        self.push(update);
    }

    fn show_idle(&mut self, status: &str) {
        let remaining = self.state.remaining_seconds;
        let formatted = if remaining > 0 {
            format_duration(i64::from(remaining))
        } else {
            "Ready".to_string()
        };
        self.push(DisplayUpdate::new(formatted, status, Phase::Idle, remaining));
    }

    fn push(&mut self, update: DisplayUpdate) {
        self.display.show(&update);
        self.last_update = update;
    }

    fn check_invariants(&self) {
        debug_assert!(self.state.is_consistent(), "inconsistent timer state: {:?}", self.state);
        debug_assert_eq!(
            self.registration.is_some(),
            self.state.phase == Phase::Running,
            "tick registration out of step with phase"
        );
    }
}

impl Drop for CountdownController {
    fn drop(&mut self) {
        self.cancel_registration();
    }
}
