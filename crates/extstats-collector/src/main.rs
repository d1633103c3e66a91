//! extstats collector
//!
//! - `POST /stats` ingests install / filter reports from the extension
//! - `GET /stats/summary` and `/` expose the counters
//! - state is persisted after every report and on a fixed interval

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use extstats_core::error::{Result, StatsError};
use extstats_collector::{app_state::AppState, config, router, store};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let listen = cfg.server.socket_addr()?;
    let snapshot_every = cfg.storage.snapshot_interval();

    let state = AppState::new(&cfg.storage).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let snapshot = snapshot_every
        .map(|every| store::spawn_snapshot_task(state.store(), every, shutdown_rx));

    let app = router::build_router(state.clone());

    tracing::info!(%listen, backend = state.store().backend_name(), "extstats-collector starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| StatsError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StatsError::Internal(format!("server failed: {e}")))?;

    let _ = shutdown_tx.send(true);
    if let Some(task) = snapshot {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "snapshot task ended abnormally");
        }
    }
    match state.store().snapshot().await {
        Ok(()) => tracing::info!("final stats snapshot written"),
        Err(e) => tracing::error!(error = %e, "final stats snapshot failed"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
