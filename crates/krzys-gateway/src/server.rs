// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use krzys_core::{HistoryLog, KrzysError, StateStore, StorageAdapter};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The singleton status record.
    pub status: Arc<dyn StateStore>,
    /// The append-only history log.
    pub history: Arc<dyn HistoryLog>,
    /// Backend lifecycle, used by the health endpoint.
    pub storage: Arc<dyn StorageAdapter>,
    /// Directory holding `index.html` and static assets, if any.
    pub frontend_dir: Option<PathBuf>,
    /// Health state for unauthenticated endpoints.
    pub health: HealthState,
}

impl AppState {
    /// Builds handler state from one backend implementing every storage trait.
    pub fn new<B>(backend: Arc<B>, frontend_dir: Option<PathBuf>) -> Self
    where
        B: StateStore + HistoryLog + StorageAdapter + 'static,
    {
        Self {
            status: backend.clone(),
            history: backend.clone(),
            storage: backend,
            frontend_dir,
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
        }
    }
}

/// Gateway server configuration (mirrors `ServerConfig` from krzys-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind. `0` picks a free port.
    pub port: u16,
}

/// Builds the application router.
///
/// Routes:
/// - GET/POST /state
/// - POST /comm
/// - GET /history
/// - GET /health
/// - GET / and /static/* (front-end, when a directory is configured)
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/state", get(handlers::get_state).post(handlers::post_state))
        .route("/comm", post(handlers::post_comm))
        .route("/history", get(handlers::get_history))
        .route("/health", get(handlers::get_health))
        .route("/", get(handlers::index));

    if let Some(dir) = &state.frontend_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
///
/// Binds to the configured host:port and serves until `shutdown` is
/// cancelled. In-flight requests are allowed to finish.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), KrzysError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| KrzysError::Server {
            message: format!("failed to bind to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    let local = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or(addr);
    tracing::info!("listening on http://{local}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| KrzysError::Server {
            message: format!("server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("server stopped");
    Ok(())
}
