// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Krzys Comm service.
//!
//! Exposes the status record and the history log as a small JSON API,
//! serves the static front-end, and reports storage health. Handlers talk
//! to storage only through the `krzys-core` traits held in [`AppState`].

pub mod handlers;
pub mod server;

pub use server::{AppState, HealthState, ServerConfig, router, start_server};
