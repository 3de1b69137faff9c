// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle trait for persistence backends.

use async_trait::async_trait;

use crate::error::KrzysError;
use crate::types::HealthStatus;

/// Lifecycle of a storage backend.
///
/// Backends open their connection, create the schema, and seed the status
/// record in [`initialize`](StorageAdapter::initialize).
#[async_trait]
pub trait StorageAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &str;

    /// Prepares the backend for use. Must be idempotent: calling it on every
    /// process start (or twice in one process) leaves existing data unchanged.
    async fn initialize(&self) -> Result<(), KrzysError>;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, KrzysError>;

    /// Flushes pending writes. The backend stays usable afterwards.
    async fn close(&self) -> Result<(), KrzysError>;
}
