// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Krzys Comm integration tests.
//!
//! Provides test harness infrastructure and an in-memory backend for fast,
//! deterministic tests without a running server.
//!
//! # Components
//!
//! - [`TestHarness`] - temp SQLite storage plus the router, driven in-process
//! - [`MockStorage`] - in-memory storage with a switchable failure mode

pub mod harness;
pub mod mock_storage;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_storage::MockStorage;
