// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Postpilot.

use thiserror::Error;

/// The primary error type used across all Postpilot adapter traits and core operations.
#[derive(Debug, Error)]
pub enum PostpilotError {
    /// Configuration errors (missing or mis-sized encryption key, invalid TOML).
    ///
    /// Raised at startup. Never recoverable per request.
    #[error("configuration error: {0}")]
    Config(String),

    /// A ciphertext/iv pair could not be opened: wrong key, tampered bytes,
    /// malformed iv, or non-UTF-8 plaintext.
    ///
    /// The message describes the failure class only and never carries
    /// plaintext or key material.
    #[error("decryption error: {0}")]
    Decryption(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The caller could not be resolved to an identity.
    #[error("unauthorized")]
    Unauthorized,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PostpilotError {
    /// Whether this error came from the cryptographic boundary.
    ///
    /// Crypto failures are deterministic given their input, so callers
    /// must not retry them.
    pub fn is_crypto(&self) -> bool {
        matches!(self, PostpilotError::Decryption(_))
    }
}
