//! Countdown Timer - a countdown service with pause, resume and reset
//!
//! This is the main entry point for the countdown-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_timer::{
    config::Config,
    services::TerminalDisplay,
    state::{AppState, Phase},
    api::create_router,
    tasks::run_countdown,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    let settings = config.timer_settings();

    // One-shot terminal countdown
    if let Some(seconds) = config.run {
        let state = match run_countdown(seconds, &settings, TerminalDisplay, shutdown_signal()).await {
            Ok(state) => state,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(2);
            }
        };
        if state.phase != Phase::Finished {
            std::process::exit(130);
        }
        return Ok(());
    }

    info!("Starting countdown-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, warn_at={:?}, restore_last={}",
          config.host, config.port, config.warn_at, config.restore_last);

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone(), settings));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timers/:name/start   - Start a countdown ({{\"seconds\": 1-3600}})");
    info!("  POST /timers/:name/pause   - Pause a running countdown");
    info!("  POST /timers/:name/resume  - Resume a paused countdown");
    info!("  POST /timers/:name/reset   - Reset a countdown to idle");
    info!("  GET  /timers/:name         - Current state of a countdown");
    info!("  GET  /status               - All timers and server info");
    info!("  GET  /health               - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
