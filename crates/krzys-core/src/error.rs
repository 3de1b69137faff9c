// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Krzys Comm service.

use thiserror::Error;

/// The error type shared by the storage traits, the gateway, and the binary.
#[derive(Debug, Error)]
pub enum KrzysError {
    /// Caller-supplied input violates a documented constraint
    /// (empty update, out-of-range field, unknown filter or speaker code).
    #[error("validation error: {0}")]
    Validation(String),

    /// The singleton status row is missing. Indicates a skipped
    /// initialization or a corrupted database.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage backend errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP server errors (bind failure, serve loop failure).
    #[error("server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KrzysError {
    /// Shorthand for a [`KrzysError::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wraps any error as a [`KrzysError::Storage`].
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// Returns true if the error was caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}
