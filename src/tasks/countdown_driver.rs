//! Tick delivery and the terminal countdown

use std::{
    future::Future,
    sync::{Arc, Mutex},
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    config::TimerSettings,
    controller::{CountdownController, TickEvent, TokioScheduler},
    error::TimerError,
    services::{DisplaySink, JsonFilePersistence, MultiDisplay, WatchDisplay},
    state::{Phase, SharedController, TimerState},
};

/// Name used for the timer of a one-shot terminal run
pub const TERMINAL_TIMER: &str = "terminal";

/// Background task that hands scheduler ticks to a shared controller
pub async fn countdown_driver_task(
    name: String,
    controller: SharedController,
    mut tick_rx: mpsc::UnboundedReceiver<TickEvent>,
) {
    info!("Starting countdown driver for '{}'", name);

    while let Some(event) = tick_rx.recv().await {
        if let Err(e) = deliver_tick(&controller, event) {
            error!("Countdown driver for '{}' stopping: {}", name, e);
            break;
        }
    }

    debug!("Countdown driver for '{}' stopped", name);
}

fn deliver_tick(controller: &SharedController, event: TickEvent) -> Result<(), String> {
    let mut controller = controller.lock()
        .map_err(|e| format!("Failed to lock timer: {}", e))?;
    controller.deliver(event);
    Ok(())
}

/// Run one countdown to completion, or until `shutdown` resolves.
///
/// Returns the final timer state: finished on completion, idle if the run
/// was interrupted.
pub async fn run_countdown<D, S>(
    seconds: i64,
    settings: &TimerSettings,
    display: D,
    shutdown: S,
) -> Result<TimerState, TimerError>
where
    D: DisplaySink + 'static,
    S: Future<Output = ()>,
{
    let (scheduler, tick_rx) = TokioScheduler::channel();
    let (watch_display, mut updates) = WatchDisplay::channel();

    let mut controller = CountdownController::new(
        TERMINAL_TIMER,
        scheduler,
        MultiDisplay::new().with(display).with(watch_display),
    )
    .with_options(settings.options.clone());
    if let Some(dir) = &settings.state_dir {
        controller = controller.with_persistence(JsonFilePersistence::for_timer(dir, TERMINAL_TIMER));
    }
    for notifier in settings.notifiers() {
        controller = controller.with_boxed_notifier(notifier);
    }

    controller.start(seconds)?;

    let controller = Arc::new(Mutex::new(controller));
    let driver = tokio::spawn(countdown_driver_task(
        TERMINAL_TIMER.to_string(),
        Arc::clone(&controller),
        tick_rx,
    ));

    let finished = async {
        updates
            .wait_for(|update| update.phase == Phase::Finished)
            .await
            .map(|_| ())
    };

    tokio::select! {
        result = finished => {
            if let Err(e) = result {
                warn!("Lost display updates before the countdown finished: {}", e);
            }
        }
        _ = shutdown => {
            info!("Countdown interrupted");
            if let Ok(mut controller) = controller.lock() {
                controller.reset();
            }
        }
    }

    driver.abort();

    let state = controller
        .lock()
        .map(|controller| controller.state().clone())
        .unwrap_or_default();
    Ok(state)
}
