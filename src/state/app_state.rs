//! Main application state management

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    config::TimerSettings,
    controller::{CountdownController, TokioScheduler},
    error::{ControlError, TimerError},
    services::{JsonFilePersistence, LogDisplay, MemoryPersistence},
    tasks::countdown_driver_task,
};

use super::TimerSnapshot;

/// A controller shared between request handlers and its driver task
pub type SharedController = Arc<Mutex<CountdownController>>;

/// Everything kept per named timer
#[derive(Clone)]
pub struct TimerHandle {
    pub controller: SharedController,
}

impl TimerHandle {
    /// Take a snapshot of the controller's state
    pub fn snapshot(&self) -> Result<TimerSnapshot, String> {
        self.controller
            .lock()
            .map(|controller| controller.snapshot())
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }
}

/// Main application state: the timer registry plus server metadata
pub struct AppState {
    /// Settings every new timer is created with
    pub settings: TimerSettings,
    timers: Mutex<HashMap<String, TimerHandle>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create a new AppState with no timers
    pub fn new(port: u16, host: String, settings: TimerSettings) -> Self {
        Self {
            settings,
            timers: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Look up a timer without creating a new one.
    ///
    /// A timer that is not loaded yet but has a state file from an earlier
    /// run is brought back, so its remembered value survives restarts.
    pub fn get(&self, name: &str) -> Result<Option<TimerHandle>, ControlError> {
        if !is_valid_timer_name(name) {
            return Err(ControlError::InvalidName(name.to_string()));
        }

        let mut timers = self.lock_timers()?;
        if let Some(handle) = timers.get(name) {
            return Ok(Some(handle.clone()));
        }

        let persisted = self
            .settings
            .state_dir
            .as_deref()
            .is_some_and(|dir| JsonFilePersistence::for_timer(dir, name).exists());
        if !persisted {
            return Ok(None);
        }

        let handle = self.create_timer(name);
        timers.insert(name.to_string(), handle.clone());
        info!("Loaded timer '{}' from its state file", name);
        Ok(Some(handle))
    }

    /// Look up a timer, creating it (and its driver task) on first use
    pub fn timer(&self, name: &str) -> Result<TimerHandle, ControlError> {
        if let Some(handle) = self.get(name)? {
            return Ok(handle);
        }

        let mut timers = self.lock_timers()?;
        // Another caller may have created it between the two locks
        let handle = match timers.get(name) {
            Some(handle) => handle.clone(),
            None => {
                let handle = self.create_timer(name);
                timers.insert(name.to_string(), handle.clone());
                info!("Created timer '{}'", name);
                handle
            }
        };
        Ok(handle)
    }

    /// Run a controller operation against an existing timer and record it as the last action
    pub fn apply<F>(&self, name: &str, action: &str, operation: F) -> Result<TimerSnapshot, ControlError>
    where
        F: FnOnce(&mut CountdownController) -> Result<(), TimerError>,
    {
        let handle = self
            .get(name)?
            .ok_or_else(|| ControlError::NotFound(name.to_string()))?;
        self.run(&handle, name, action, operation)
    }

    /// Like [`AppState::apply`], but creates the timer when it does not exist yet
    pub fn apply_or_create<F>(&self, name: &str, action: &str, operation: F) -> Result<TimerSnapshot, ControlError>
    where
        F: FnOnce(&mut CountdownController) -> Result<(), TimerError>,
    {
        let handle = self.timer(name)?;
        self.run(&handle, name, action, operation)
    }

    fn run<F>(&self, handle: &TimerHandle, name: &str, action: &str, operation: F) -> Result<TimerSnapshot, ControlError>
    where
        F: FnOnce(&mut CountdownController) -> Result<(), TimerError>,
    {
        let snapshot = {
            let mut controller = handle.controller.lock()
                .map_err(|e| ControlError::Internal(format!("Failed to lock timer '{}': {}", name, e)))?;
            operation(&mut *controller)?;
            controller.snapshot()
        };

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(format!("{} {}", action, name));
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(snapshot)
    }

    /// Snapshots of every timer, ordered by name
    pub fn snapshots(&self) -> Result<Vec<TimerSnapshot>, String> {
        let handles: Vec<TimerHandle> = {
            let timers = self.lock_timers().map_err(|e| e.to_string())?;
            timers.values().cloned().collect()
        };

        let mut snapshots = handles
            .iter()
            .map(TimerHandle::snapshot)
            .collect::<Result<Vec<_>, _>>()?;
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(snapshots)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn lock_timers(&self) -> Result<MutexGuard<'_, HashMap<String, TimerHandle>>, ControlError> {
        self.timers.lock()
            .map_err(|e| ControlError::Internal(format!("Failed to lock timer registry: {}", e)))
    }

    fn create_timer(&self, name: &str) -> TimerHandle {
        let (scheduler, tick_rx) = TokioScheduler::channel();

        let mut controller = CountdownController::new(name, scheduler, LogDisplay::new(name))
            .with_options(self.settings.options.clone());
        controller = match &self.settings.state_dir {
            Some(dir) => controller.with_persistence(JsonFilePersistence::for_timer(dir, name)),
            None => controller.with_persistence(MemoryPersistence::new()),
        };
        for notifier in self.settings.notifiers() {
            controller = controller.with_boxed_notifier(notifier);
        }

        let controller = Arc::new(Mutex::new(controller));
        tokio::spawn(countdown_driver_task(
            name.to_string(),
            Arc::clone(&controller),
            tick_rx,
        ));

        TimerHandle { controller }
    }
}

/// Timer names double as file names, so keep them to a safe alphabet
pub fn is_valid_timer_name(name: &str) -> bool {
    (1..=64).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
