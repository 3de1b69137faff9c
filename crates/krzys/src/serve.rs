// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `krzys serve` command implementation.
//!
//! Opens and initializes SQLite storage, serves the HTTP API until a
//! shutdown signal arrives, then checkpoints and closes storage.

use std::sync::Arc;

use krzys_config::model::KrzysConfig;
use krzys_core::{KrzysError, StorageAdapter};
use krzys_gateway::{AppState, ServerConfig, start_server};
use krzys_storage::SqliteStorage;
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `krzys serve` command.
pub async fn run_serve(config: KrzysConfig) -> Result<(), KrzysError> {
    init_tracing(&config.logging.level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting krzys serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage ready");

    let frontend_dir = config.server.frontend_path();
    if let Some(dir) = &frontend_dir
        && !dir.join("index.html").is_file()
    {
        warn!(dir = %dir.display(), "front-end index.html not found; GET / will return 404");
    }

    let state = AppState::new(storage.clone(), frontend_dir);
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&server_config, state, cancel).await;

    if let Err(e) = storage.close().await {
        error!(error = %e, "failed to close storage cleanly");
    }
    served?;

    info!("krzys serve shutdown complete");
    Ok(())
}

/// Initializes the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `level`. Safe to call more than once;
/// later calls are ignored.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_directives(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("krzys={level},tower_http={level},warn")
}
