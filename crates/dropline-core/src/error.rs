// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Dropline delivery notifier.

use thiserror::Error;

/// The primary error type used across all Dropline crates.
#[derive(Debug, Error)]
pub enum DroplineError {
    /// Configuration errors (invalid TOML, missing required credential, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// SMS gateway errors (send failure, webhook decode, rate limiting).
    #[error("sms error: {message}")]
    Sms {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Extraction oracle errors (API failure, malformed intent payload).
    #[error("oracle error: {message}")]
    Oracle {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Route-planning provider errors (registration or stop push failure).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
