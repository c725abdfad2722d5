// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret value acquisition for operator commands, via TTY prompt or the
//! POSTPILOT_SECRET_VALUE environment variable.

use postpilot_core::{PostpilotError, SecretSlot};
use secrecy::SecretString;

/// The environment variable name for supplying a secret non-interactively.
pub const SECRET_VALUE_ENV_VAR: &str = "POSTPILOT_SECRET_VALUE";

/// Get the plaintext for `slot` from the environment or a hidden prompt.
///
/// Priority:
/// 1. `POSTPILOT_SECRET_VALUE` environment variable (scripts, CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn read_secret_value(slot: SecretSlot) -> Result<SecretString, PostpilotError> {
    if let Ok(value) = std::env::var(SECRET_VALUE_ENV_VAR)
        && !value.is_empty()
    {
        return Ok(SecretString::from(value));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("Value for {slot}: ");
        let value = rpassword::read_password()
            .map_err(|e| PostpilotError::Internal(format!("failed to read secret: {e}")))?;
        if value.is_empty() {
            return Err(PostpilotError::Internal(
                "empty secret not allowed".to_string(),
            ));
        }
        return Ok(SecretString::from(value));
    }

    Err(PostpilotError::Internal(format!(
        "No secret provided. Set {SECRET_VALUE_ENV_VAR} or run interactively."
    )))
}
