// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Krzys Comm service.
//!
//! Provides WAL-mode SQLite storage behind a single-writer connection
//! (`tokio-rusqlite`), the singleton status record, and the append-only
//! history log. [`SqliteStorage`] implements the storage traits from
//! `krzys-core`.

pub mod adapter;
pub mod database;
pub mod queries;
pub mod schema;

pub use adapter::SqliteStorage;
pub use database::Database;
