// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the storage layer and the HTTP gateway.
//!
//! The wire format is camelCase JSON (`heartRate`, `updatedAt`). This differs
//! from the legacy service, which returned and stored snake_case
//! (`heart_rate`, `updated_at`); snake_case is still accepted on input and in
//! stored snapshots, so an older database holds a mix of both. History
//! content is a closed union keyed by [`EntryKind`]; JSON text only exists at
//! the storage edge, see [`HistoryContent::encode`] and [`HistoryContent::decode`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::KrzysError;

/// Fixed primary key of the singleton status row.
pub const STATUS_ROW_ID: i64 = 1;

/// Inclusive upper bound for [`StatusRecord::energy`].
pub const MAX_ENERGY: i64 = 100;

/// Health status reported by storage health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Storage is fully operational.
    Healthy,
    /// Storage is operational but experiencing issues.
    Degraded(String),
    /// Storage is not operational.
    Unhealthy(String),
}

/// The single mutable current-status record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    /// Energy level in `[0, 100]`.
    pub energy: i64,
    /// Heart rate, never negative.
    #[serde(alias = "heart_rate")]
    pub heart_rate: i64,
    /// Temperature, unconstrained.
    pub temperature: f64,
    /// Short mood label.
    pub mood: String,
    /// Timestamp of the last mutation. Snapshots in older history rows
    /// carry none and decode as empty.
    #[serde(default, alias = "updated_at")]
    pub updated_at: String,
}

impl StatusRecord {
    /// The record written on first initialization.
    pub fn seed(updated_at: String) -> Self {
        Self {
            energy: 100,
            heart_rate: 2,
            temperature: -5.5,
            mood: "neutral".to_string(),
            updated_at,
        }
    }
}

/// A partial update of a [`StatusRecord`]. Absent fields keep their value.
///
/// Accepts the legacy snake_case spelling `heart_rate` on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<i64>,
    #[serde(default, alias = "heart_rate", skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

impl StatusChanges {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.energy.is_none()
            && self.heart_rate.is_none()
            && self.temperature.is_none()
            && self.mood.is_none()
    }

    /// Checks that the change set is non-empty and every field is in range.
    pub fn validate(&self) -> Result<(), KrzysError> {
        if self.is_empty() {
            return Err(KrzysError::validation("no fields to update"));
        }
        if let Some(energy) = self.energy
            && !(0..=MAX_ENERGY).contains(&energy)
        {
            return Err(KrzysError::validation(format!(
                "energy must be between 0 and {MAX_ENERGY}, got {energy}"
            )));
        }
        if let Some(heart_rate) = self.heart_rate
            && heart_rate < 0
        {
            return Err(KrzysError::validation(format!(
                "heartRate must be non-negative, got {heart_rate}"
            )));
        }
        if let Some(temperature) = self.temperature
            && !temperature.is_finite()
        {
            return Err(KrzysError::validation("temperature must be a finite number"));
        }
        Ok(())
    }

    /// Merges the set fields over `current`, stamping `updated_at`.
    pub fn apply_to(&self, current: &StatusRecord, updated_at: String) -> StatusRecord {
        StatusRecord {
            energy: self.energy.unwrap_or(current.energy),
            heart_rate: self.heart_rate.unwrap_or(current.heart_rate),
            temperature: self.temperature.unwrap_or(current.temperature),
            mood: self.mood.clone().unwrap_or_else(|| current.mood.clone()),
            updated_at,
        }
    }
}

/// Discriminates history entries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Audit record of a status change.
    State,
    /// A message between the two parties.
    Comm,
}

impl EntryKind {
    /// Parses a filter value, rejecting anything but `state` and `comm`.
    pub fn parse(value: &str) -> Result<Self, KrzysError> {
        value
            .parse()
            .map_err(|_| KrzysError::validation(format!("kind must be 'state' or 'comm', got `{value}`")))
    }

    /// The label stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Comm => "comm",
        }
    }
}

/// One of the two parties exchanging messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// Code `0`.
    Krzys,
    /// Code `1`.
    User,
}

impl Speaker {
    /// Resolves the numeric code used by the `who` query parameter.
    pub fn from_code(code: i64) -> Result<Self, KrzysError> {
        match code {
            0 => Ok(Self::Krzys),
            1 => Ok(Self::User),
            other => Err(KrzysError::validation(format!(
                "who must be 0 (krzys) or 1 (user), got {other}"
            ))),
        }
    }

    /// The label stored in the `who` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Krzys => "krzys",
            Self::User => "user",
        }
    }
}

/// Content of a `state` entry: what changed and the full resulting record,
/// including the new `updatedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub changed: StatusChanges,
    pub state: StatusRecord,
}

/// Content of a `comm` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommMessage {
    pub message: String,
}

/// Structured payload of a history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryContent {
    State(StateChange),
    Comm(CommMessage),
    /// Stored text that could not be parsed as the payload of its kind.
    Raw { raw: String },
}

impl HistoryContent {
    /// Builds `comm` content.
    pub fn message(text: impl Into<String>) -> Self {
        Self::Comm(CommMessage {
            message: text.into(),
        })
    }

    /// The kind this content belongs to; `None` for degraded content.
    pub fn kind(&self) -> Option<EntryKind> {
        match self {
            Self::State(_) => Some(EntryKind::State),
            Self::Comm(_) => Some(EntryKind::Comm),
            Self::Raw { .. } => None,
        }
    }

    /// Serializes the payload for the `content` column.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a stored `content` column for an entry of `kind`.
    ///
    /// Never fails: text that is not a valid payload for `kind` is kept
    /// verbatim as [`HistoryContent::Raw`].
    pub fn decode(kind: EntryKind, stored: &str) -> Self {
        let parsed = match kind {
            EntryKind::State => serde_json::from_str(stored).map(Self::State),
            EntryKind::Comm => serde_json::from_str(stored).map(Self::Comm),
        };
        parsed.unwrap_or_else(|_| Self::Raw {
            raw: stored.to_string(),
        })
    }
}

/// One immutable row of the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub who: Option<Speaker>,
    pub content: HistoryContent,
    pub ts: String,
}

/// Filter and bound for a history query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Maximum number of rows; `None` is unbounded.
    pub limit: Option<i64>,
    /// Kinds to include; empty includes every kind.
    pub kinds: Vec<EntryKind>,
}

impl HistoryQuery {
    /// A query returning every entry.
    pub fn all() -> Self {
        Self::default()
    }

    /// Bounds the result. Zero or negative limits mean unbounded.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    /// Adds a kind to the filter set.
    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    /// Builds a query from raw request parameters. An empty `kind` is ignored.
    pub fn from_params(limit: Option<i64>, kind: Option<&str>) -> Result<Self, KrzysError> {
        let mut query = Self::all();
        if let Some(limit) = limit {
            query = query.with_limit(limit);
        }
        if let Some(kind) = kind.filter(|k| !k.is_empty()) {
            query = query.with_kind(EntryKind::parse(kind)?);
        }
        Ok(query)
    }
}
