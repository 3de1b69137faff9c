// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The append-only history log.

use async_trait::async_trait;

use crate::error::KrzysError;
use crate::types::{EntryKind, HistoryContent, HistoryEntry, HistoryQuery, Speaker};

/// Append-only record of status changes and messages.
#[async_trait]
pub trait HistoryLog: Send + Sync + 'static {
    /// Appends an entry and returns its timestamp.
    ///
    /// `content` must belong to `kind`, and `who` must be `None` for
    /// [`EntryKind::State`]; otherwise fails with [`KrzysError::Validation`].
    async fn append(
        &self,
        kind: EntryKind,
        who: Option<Speaker>,
        content: HistoryContent,
    ) -> Result<String, KrzysError>;

    /// Returns matching entries, newest first.
    async fn query(&self, query: &HistoryQuery) -> Result<Vec<HistoryEntry>, KrzysError>;
}

/// Checks the arguments of [`HistoryLog::append`].
pub fn validate_append(
    kind: EntryKind,
    who: Option<Speaker>,
    content: &HistoryContent,
) -> Result<(), KrzysError> {
    if content.kind() != Some(kind) {
        return Err(KrzysError::validation(format!(
            "content does not match entry kind `{kind}`"
        )));
    }
    if kind == EntryKind::State && who.is_some() {
        return Err(KrzysError::validation("state entries do not have a speaker"));
    }
    Ok(())
}
