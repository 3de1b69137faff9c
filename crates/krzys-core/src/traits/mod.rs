// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait definitions.
//!
//! The gateway depends only on these traits; `krzys-storage` provides the
//! SQLite implementation. All traits use `#[async_trait]` so they can be used
//! as `Arc<dyn ...>` trait objects.

pub mod history;
pub mod state;
pub mod storage;

pub use history::HistoryLog;
pub use state::StateStore;
pub use storage::StorageAdapter;
