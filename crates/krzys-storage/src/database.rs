// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All reads and writes are serialized through tokio-rusqlite's single
//! background thread: each `call()` closure runs to completion before the next
//! one starts. A [`Database`] is therefore the one lock guarding the store.
//! Do NOT create additional Connection instances for the same file.

use std::time::Duration;

use krzys_config::model::StorageConfig;
use krzys_core::KrzysError;
use tracing::debug;

/// Handle to the single SQLite connection.
///
/// Cloning is cheap; clones share the same background thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database file and apply connection PRAGMAs.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub async fn open(config: &StorageConfig) -> Result<Self, KrzysError> {
        let conn = tokio_rusqlite::Connection::open(&config.database_path)
            .await
            .map_err(KrzysError::storage)?;

        let wal_mode = config.wal_mode;
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            conn.busy_timeout(busy_timeout)?;
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode=WAL;")?;
            }
            conn.execute_batch("PRAGMA synchronous=NORMAL;")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path = %config.database_path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection. Query modules submit their
    /// closures through it.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), KrzysError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert a tokio-rusqlite error into [`KrzysError::Storage`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> KrzysError {
    KrzysError::Storage {
        source: Box::new(e),
    }
}
