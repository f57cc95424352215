//! Best-effort completion side effects

use std::io::Write;

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

use crate::error::NotifyError;

/// Side effect fired once when a countdown finishes.
///
/// Errors are reported to the caller but the controller never lets them
/// interrupt the transition to finished.
pub trait CompletionNotifier: Send {
    fn notify(&self, timer: &str) -> Result<(), NotifyError>;
}

/// Rings the terminal bell
#[derive(Debug, Default, Clone, Copy)]
pub struct BellNotifier;

impl CompletionNotifier for BellNotifier {
    fn notify(&self, _timer: &str) -> Result<(), NotifyError> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }
}

/// Runs a shell command when a countdown finishes
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    command: String,
}

impl CommandNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl CompletionNotifier for CommandNotifier {
    fn notify(&self, timer: &str) -> Result<(), NotifyError> {
        let handle = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        let command = self.command.clone();
        let timer = timer.to_string();

        handle.spawn(async move {
            debug!("Running completion command for '{}': {}", timer, command);

            let output = Command::new("sh")
                .args(["-c", command.as_str()])
                .env("COUNTDOWN_TIMER", &timer)
                .output()
                .await
                .map_err(|e| format!("Failed to execute completion command: {}", e));

            match output {
                Ok(output) if output.status.success() => {
                    info!("Completion command for '{}' finished", timer);
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("Completion command for '{}' failed: {}", timer, stderr.trim());
                }
                Err(e) => warn!("{}", e),
            }
        });

        Ok(())
    }
}
