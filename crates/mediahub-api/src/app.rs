//! Application builder: wires the catalog, the media server channel and
//! the router into a running server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tracing::{info, warn};

use mediahub_core::config::AppConfig;
use mediahub_core::error::AppError;
use mediahub_database::{CatalogPool, PgFolderCatalog};
use mediahub_remote::executor_from_config;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the MediaHub server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting MediaHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Catalog database ─────────────────────────────────
    let db = CatalogPool::connect(&config.database).await?;
    let catalog = Arc::new(PgFolderCatalog::new(db.clone()));

    // ── Step 2: Media server channel ─────────────────────────────
    let executor = executor_from_config(&config.remote);
    info!(
        transport = executor.transport(),
        content_root = %config.remote.content_root,
        servers = config.remote.servers.len(),
        "Media server channel ready"
    );

    let default_server = match config.remote.resolve_default_server() {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "Folders can only be created with an explicit server");
            None
        }
    };

    // ── Step 3: HTTP server ──────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(config, catalog, executor, default_server);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("MediaHub server listening on {}", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // In-flight folder operations get `shutdown_grace_seconds` to finish.
    let result = tokio::select! {
        served = server.into_future() => {
            served.map_err(|e| AppError::internal(format!("Server error: {e}")))
        }
        _ = async {
            let _ = shutdown_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_seconds = grace.as_secs(), "Shutdown grace period elapsed with requests in flight");
            Ok(())
        }
    };

    db.close().await;
    info!("MediaHub server stopped");

    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
