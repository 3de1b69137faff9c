// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp helpers.
//!
//! All persisted timestamps are RFC 3339 UTC strings with microsecond
//! precision and a `Z` suffix, e.g. `2026-01-01T12:00:00.123456Z`. The fixed
//! width makes lexicographic order equal to chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a UTC instant in the persisted timestamp format.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The current time in the persisted timestamp format.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Timestamp for a mutation that follows `previous`.
///
/// Returns the current time unless the wall clock reads earlier than
/// `previous`, in which case `previous` is reused so `updatedAt` never moves
/// backwards. An unparseable `previous` is ignored.
pub fn next_timestamp(previous: &str) -> String {
    let now = Utc::now();
    match DateTime::parse_from_rfc3339(previous) {
        Ok(prev) if prev.with_timezone(&Utc) > now => format_timestamp(prev.with_timezone(&Utc)),
        _ => format_timestamp(now),
    }
}
