// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage backend for deterministic testing.
//!
//! `MockStorage` implements the storage traits over plain collections behind
//! one mutex, and can be switched into a failing mode to exercise the
//! server-error paths of callers.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use krzys_core::time::{next_timestamp, now_timestamp};
use krzys_core::traits::history::validate_append;
use krzys_core::types::{
    EntryKind, HealthStatus, HistoryContent, HistoryEntry, HistoryQuery, Speaker, StateChange,
    StatusChanges, StatusRecord,
};
use krzys_core::{HistoryLog, KrzysError, StateStore, StorageAdapter};

#[derive(Default)]
struct Inner {
    status: Option<StatusRecord>,
    history: Vec<HistoryEntry>,
}

/// A storage backend that keeps everything in memory.
#[derive(Default)]
pub struct MockStorage {
    inner: Mutex<Inner>,
    failing: AtomicBool,
}

impl MockStorage {
    /// Create an empty backend. Call `initialize()` to seed the status record.
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every operation fails with [`KrzysError::Storage`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), KrzysError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(KrzysError::storage(std::io::Error::other(
                "mock storage failure",
            )))
        } else {
            Ok(())
        }
    }
}

fn push_entry(
    inner: &mut Inner,
    kind: EntryKind,
    who: Option<Speaker>,
    content: HistoryContent,
    ts: String,
) {
    let id = inner.history.last().map_or(1, |e| e.id + 1);
    inner.history.push(HistoryEntry {
        id,
        kind,
        who,
        content,
        ts,
    });
}

#[async_trait]
impl StorageAdapter for MockStorage {
    fn name(&self) -> &str {
        "mock"
    }

    async fn initialize(&self) -> Result<(), KrzysError> {
        self.check()?;
        let mut inner = self.inner.lock().await;
        if inner.status.is_none() {
            inner.status = Some(StatusRecord::seed(now_timestamp()));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthStatus, KrzysError> {
        if self.failing.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("mock storage failure".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn close(&self) -> Result<(), KrzysError> {
        Ok(())
    }
}

#[async_trait]
impl StateStore for MockStorage {
    async fn current(&self) -> Result<StatusRecord, KrzysError> {
        self.check()?;
        self.inner
            .lock()
            .await
            .status
            .clone()
            .ok_or_else(|| KrzysError::NotFound("status record".to_string()))
    }

    async fn apply_update(&self, changes: StatusChanges) -> Result<StatusRecord, KrzysError> {
        changes.validate()?;
        self.check()?;
        let mut inner = self.inner.lock().await;
        let current = inner
            .status
            .clone()
            .ok_or_else(|| KrzysError::NotFound("status record".to_string()))?;

        let updated = changes.apply_to(&current, next_timestamp(&current.updated_at));
        inner.status = Some(updated.clone());
        let content = HistoryContent::State(StateChange {
            changed: changes,
            state: updated.clone(),
        });
        push_entry(
            &mut inner,
            EntryKind::State,
            None,
            content,
            updated.updated_at.clone(),
        );
        Ok(updated)
    }
}

#[async_trait]
impl HistoryLog for MockStorage {
    async fn append(
        &self,
        kind: EntryKind,
        who: Option<Speaker>,
        content: HistoryContent,
    ) -> Result<String, KrzysError> {
        validate_append(kind, who, &content)?;
        self.check()?;
        let ts = now_timestamp();
        push_entry(&mut *self.inner.lock().await, kind, who, content, ts.clone());
        Ok(ts)
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<HistoryEntry>, KrzysError> {
        self.check()?;
        let inner = self.inner.lock().await;
        let matching = inner
            .history
            .iter()
            .rev()
            .filter(|e| query.kinds.is_empty() || query.kinds.contains(&e.kind))
            .cloned();
        Ok(match query.limit {
            Some(limit) => matching.take(usize::try_from(limit).unwrap_or(usize::MAX)).collect(),
            None => matching.collect(),
        })
    }
}
