//! Badge Timer - entry point
//!
//! Loads the timer from the store, runs the engine loop and serves the UI
//! bridge until a shutdown signal arrives.

use std::{sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tracing::{info, warn};

use badge_timer::{
    api::{create_router, ApiState},
    badge::WatchBadgeSink,
    clock::SystemClock,
    config::Config,
    state::EngineDeps,
    storage::{JsonFileStore, Persistence},
    tasks::spawn_engine,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!("badge_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting badge-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, store={}, tick={}ms",
        config.host,
        config.port,
        config.store.display(),
        config.tick_ms
    );

    let store = Arc::new(JsonFileStore::new(&config.store));
    let (persistence, _storage_worker) = Persistence::spawn(store);

    let (badge_sink, badge_rx) = WatchBadgeSink::new();
    let deps = EngineDeps {
        persistence: persistence.clone(),
        badge: Arc::new(badge_sink),
        clock: Arc::new(SystemClock),
        tick_period: config.tick_period(),
    };
    let (engine, _engine_loop) = spawn_engine(deps).await;

    let mut updates = engine.subscribe_updates();
    tokio::spawn(async move {
        while let Ok(update) = updates.recv().await {
            tracing::trace!("timerUpdate elapsed={} delay={}", update.elapsed, update.delay);
        }
    });

    let app = create_router(ApiState::new(engine, badge_rx));
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("UI bridge listening on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /message - startTimer | pauseTimer | resetTimer | getTimerStatus");
    info!("                  getPresets | setPresets | setTargetMinutes");
    info!("  GET  /status  - Timer status and current badge");
    info!("  GET  /badge   - Current badge text and color");
    info!("  GET  /health  - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            info!("Shutdown signal {} received", signal);
        }
    }

    // Transitions are persisted write-behind; let queued writes land
    if tokio::time::timeout(Duration::from_secs(2), persistence.flush())
        .await
        .is_err()
    {
        warn!("Timed out flushing pending writes");
    }

    info!("Shutdown complete");
    Ok(())
}
