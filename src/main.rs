//! Tomato Timer - a state-managed HTTP server backing a Pomodoro popup
//!
//! This is the main entry point for the tomato-timer application.

use std::sync::Arc;

use chrono::Utc;
use tokio::net::TcpListener;
use tracing::info;

use tomato_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    storage::StateStore,
    tasks::tick_driver_task,
    timer::TimerMachine,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tomato_timer={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting tomato-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, state_file={}",
        config.host,
        config.port,
        config.state_file.display()
    );

    // Restore the persisted run, falling back to a fresh machine when the
    // snapshot is absent or corrupt
    let store = StateStore::new(&config.state_file);
    let mut machine = match store.load() {
        Some(snapshot) => snapshot.into_machine(),
        None => TimerMachine::new(Utc::now()),
    };

    // If the host suspended us mid-run, move the wall-clock projections
    // forward; elapsed counters are exactly what was flushed
    machine.reconcile_after_reload(Utc::now());

    // Create application state
    let state = Arc::new(AppState::new(machine, store));

    // Start the tick driver background task; it picks up a restored
    // running state on its own
    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_driver_task(tick_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /state    - Current timer snapshot");
    info!("  POST   /toggle   - Start, pause or resume the timer");
    info!("  POST   /settings - Update timer settings");
    info!("  DELETE /state    - Clear the run and reset defaults");
    info!("  GET    /events   - Snapshot change stream (SSE)");
    info!("  GET    /health   - Health check");

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

    // Flush-on-suspend: make the latest snapshot durable before exiting
    if let Err(e) = state.flush() {
        tracing::error!("Failed to flush snapshot on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
