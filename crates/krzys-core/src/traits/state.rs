// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The singleton status record.

use async_trait::async_trait;

use crate::error::KrzysError;
use crate::types::{StatusChanges, StatusRecord};

/// Holds exactly one current [`StatusRecord`] and records every mutation in
/// the history log.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Returns the current record.
    ///
    /// Fails with [`KrzysError::NotFound`] if the singleton row is missing.
    async fn current(&self) -> Result<StatusRecord, KrzysError>;

    /// Merges `changes` over the current record and appends a `state` history
    /// entry, atomically with respect to every other storage operation.
    ///
    /// Fails with [`KrzysError::Validation`] for an empty or out-of-range
    /// change set; nothing is written in that case.
    async fn apply_update(&self, changes: StatusChanges) -> Result<StatusRecord, KrzysError>;
}
