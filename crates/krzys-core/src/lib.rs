// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Krzys Comm service.
//!
//! Defines the status record and history log domain types, the error
//! taxonomy, and the storage traits implemented by `krzys-storage` and
//! consumed by `krzys-gateway`.

pub mod error;
pub mod time;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KrzysError;
pub use types::{
    CommMessage, EntryKind, HealthStatus, HistoryContent, HistoryEntry, HistoryQuery, Speaker,
    StateChange, StatusChanges, StatusRecord,
};

pub use traits::{HistoryLog, StateStore, StorageAdapter};
