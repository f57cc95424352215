//! Repeating tick registrations

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    sync::mpsc,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// One firing of a registration, tagged with the epoch it was registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub epoch: u64,
}

/// Source of periodic ticks for a countdown
pub trait Scheduler: Send {
    /// Start delivering ticks every `period` until the registration is cancelled
    fn register(&mut self, epoch: u64, period: Duration) -> TickRegistration;
}

/// Handle on a live tick registration.
///
/// Cancelling is idempotent. Dropping the handle cancels it as well.
pub struct TickRegistration {
    epoch: u64,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickRegistration {
    pub fn new<F>(epoch: u64, cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            epoch,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            debug!("Cancelling tick registration {}", self.epoch);
            cancel();
        }
    }
}

impl Drop for TickRegistration {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TickRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickRegistration")
            .field("epoch", &self.epoch)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Scheduler backed by tokio intervals.
///
/// Each registration is its own task sending [`TickEvent`]s down a channel;
/// whoever owns the receiving end hands them to the controller.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<TickEvent>,
}

impl TokioScheduler {
    pub fn new(tx: mpsc::UnboundedSender<TickEvent>) -> Self {
        Self { tx }
    }

    /// Create a scheduler together with the receiver its ticks arrive on
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TickEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Scheduler for TokioScheduler {
    fn register(&mut self, epoch: u64, period: Duration) -> TickRegistration {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            // First tick one full period after registering, not immediately
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if tx.send(TickEvent { epoch }).is_err() {
                    debug!("Tick receiver dropped, stopping registration {}", epoch);
                    break;
                }
            }
        });

        TickRegistration::new(epoch, move || task.abort())
    }
}

/// Scheduler that never fires by itself.
///
/// Tracks which registrations are live so callers driving `tick()` by hand
/// can check that cancellation happened.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    live: Arc<Mutex<Vec<u64>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Epochs of registrations that have not been cancelled yet
    pub fn live_registrations(&self) -> Vec<u64> {
        self.live.lock().map(|live| live.clone()).unwrap_or_default()
    }
}

impl Scheduler for ManualScheduler {
    fn register(&mut self, epoch: u64, _period: Duration) -> TickRegistration {
        if let Ok(mut live) = self.live.lock() {
            live.push(epoch);
        }

        let live = Arc::clone(&self.live);
        TickRegistration::new(epoch, move || {
            if let Ok(mut live) = live.lock() {
                live.retain(|&e| e != epoch);
            }
        })
    }
}
