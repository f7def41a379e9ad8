//! # Smart POS API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Startup sequence                                │
//! │                                                                         │
//! │  ApiConfig::load ──► tracing ──► bootstrap::connect (backoff, migrate)  │
//! │       ──► bootstrap::ensure_admin ──► spawn AuditWorker                 │
//! │       ──► axum::serve (HTTP :8000) until Ctrl+C / SIGTERM               │
//! │       ──► drop state, drain audit channel, close pool                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use smartpos_api::{bootstrap, build_router, ApiConfig, AppState};
use smartpos_db::AuditRecorder;

const AUDIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load().context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting Smart POS API server...");
    info!(
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );

    let db = bootstrap::connect(&config)
        .await
        .context("Database did not become ready")?;
    bootstrap::ensure_admin(&db, &config)
        .await
        .context("Failed to create the initial manager")?;

    let (audit, worker) = AuditRecorder::channel(config.audit_buffer, db.audit_logs());
    let audit_task = tokio::spawn(worker.run());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::new(db.clone(), audit, config);
    let app = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router (and every recorder it held) is gone; the worker finishes
    // what is queued and stops.
    match tokio::time::timeout(AUDIT_DRAIN_TIMEOUT, audit_task).await {
        Ok(_) => info!("Audit trail flushed"),
        Err(_) => warn!("Audit worker did not finish in time, pending entries lost"),
    }

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
