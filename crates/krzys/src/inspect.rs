// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `krzys state`, `krzys history`, and `krzys config`.
//!
//! Read-only inspection commands. They open the configured database
//! directly, so they work whether or not a server is running.

use krzys_config::model::KrzysConfig;
use krzys_core::types::HistoryQuery;
use krzys_core::{HistoryLog, KrzysError, StateStore, StorageAdapter};
use krzys_storage::SqliteStorage;
use serde::Serialize;

async fn open_storage(config: &KrzysConfig) -> Result<SqliteStorage, KrzysError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(storage)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, KrzysError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| KrzysError::Internal(format!("failed to render JSON: {e}")))
}

/// The current status record, pretty-printed.
pub async fn state_json(config: &KrzysConfig) -> Result<String, KrzysError> {
    let storage = open_storage(config).await?;
    let record = storage.current().await?;
    storage.close().await?;
    to_json(&record)
}

/// History entries matching `limit` and `kind`, pretty-printed.
pub async fn history_json(
    config: &KrzysConfig,
    limit: Option<i64>,
    kind: Option<&str>,
) -> Result<String, KrzysError> {
    let query = HistoryQuery::from_params(limit, kind)?;
    let storage = open_storage(config).await?;
    let entries = storage.query(&query).await?;
    storage.close().await?;
    to_json(&entries)
}

/// The effective configuration as TOML.
pub fn config_toml(config: &KrzysConfig) -> Result<String, KrzysError> {
    toml::to_string_pretty(config)
        .map_err(|e| KrzysError::Config(format!("failed to render config: {e}")))
}
