// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the herald campaign engine.

use thiserror::Error;

/// The primary error type used across all herald crates.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Delivery vendor errors (request could not be made, malformed response).
    ///
    /// A vendor-side business failure is not an error; it arrives as a
    /// [`crate::vendor::VendorStatus::Failed`] response.
    #[error("vendor error: {message}")]
    Vendor {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Assist provider errors (API failure, unparseable completion).
    #[error("assist error: {message}")]
    Assist {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: i64 },

    /// Input rejected before reaching storage.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
