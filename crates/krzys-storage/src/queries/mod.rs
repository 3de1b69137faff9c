// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the status record and the history log.

pub mod history;
pub mod state;
