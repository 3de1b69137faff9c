// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use krzys_config::model::StorageConfig;
use krzys_core::traits::history::validate_append;
use krzys_core::types::{
    EntryKind, HealthStatus, HistoryContent, HistoryEntry, HistoryQuery, Speaker, StatusChanges,
    StatusRecord,
};
use krzys_core::{HistoryLog, KrzysError, StateStore, StorageAdapter};

use crate::database::{Database, map_tr_err};
use crate::{queries, schema};

/// SQLite-backed storage.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened lazily by the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: StorageAdapter::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    pub fn database(&self) -> Result<&Database, KrzysError> {
        self.db.get().ok_or_else(|| KrzysError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn initialize(&self) -> Result<(), KrzysError> {
        let db = self
            .db
            .get_or_try_init(|| Database::open(&self.config))
            .await?;
        schema::ensure_schema(db).await?;
        if queries::state::seed_status(db).await? {
            info!(path = %self.config.database_path, "seeded default status record");
        }
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthStatus, KrzysError> {
        let db = self.database()?;
        let has_status = db
            .connection()
            .call(|conn| -> Result<bool, rusqlite::Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM state", [], |row| row.get(0))?;
                Ok(count == 1)
            })
            .await
            .map_err(map_tr_err)?;

        if has_status {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("status record missing".to_string()))
        }
    }

    async fn close(&self) -> Result<(), KrzysError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for SqliteStorage {
    async fn current(&self) -> Result<StatusRecord, KrzysError> {
        queries::state::get_status(self.database()?)
            .await?
            .ok_or_else(missing_status)
    }

    async fn apply_update(&self, changes: StatusChanges) -> Result<StatusRecord, KrzysError> {
        changes.validate()?;
        queries::state::apply_update(self.database()?, changes)
            .await?
            .ok_or_else(missing_status)
    }
}

#[async_trait]
impl HistoryLog for SqliteStorage {
    async fn append(
        &self,
        kind: EntryKind,
        who: Option<Speaker>,
        content: HistoryContent,
    ) -> Result<String, KrzysError> {
        validate_append(kind, who, &content)?;
        let (_, ts) = queries::history::append(self.database()?, kind, who, &content).await?;
        Ok(ts)
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<HistoryEntry>, KrzysError> {
        queries::history::query(self.database()?, query).await
    }
}

fn missing_status() -> KrzysError {
    KrzysError::NotFound("status record".to_string())
}
