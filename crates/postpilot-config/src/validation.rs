// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates constraints serde cannot express: the vault key width, non-empty
//! bind host and database path, and the shape of the auth token table.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{PostpilotConfig, ENCRYPTION_KEY_LEN};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PostpilotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match config.vault.encryption_key.as_deref() {
        None | Some("") => errors.push(ConfigError::Validation {
            message: format!(
                "vault.encryption_key is required; set ENCRYPTION_KEY to a {ENCRYPTION_KEY_LEN}-byte value"
            ),
        }),
        // Report the length only. The key itself must never reach stderr.
        Some(key) if key.len() != ENCRYPTION_KEY_LEN => errors.push(ConfigError::Validation {
            message: format!(
                "vault.encryption_key must be exactly {ENCRYPTION_KEY_LEN} bytes, got {}",
                key.len()
            ),
        }),
        Some(_) => {}
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let mut seen_tokens = HashSet::new();
    for (i, entry) in config.auth.tokens.iter().enumerate() {
        if entry.token.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("auth.tokens[{i}].token must not be empty"),
            });
        }
        if entry.user_id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("auth.tokens[{i}].user_id must not be empty"),
            });
        }
        if !seen_tokens.insert(entry.token.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("auth.tokens[{i}] duplicates an earlier token"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
