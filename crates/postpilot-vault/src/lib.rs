// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM credential vault for Postpilot.
//!
//! Encrypts per-user third-party API keys before they reach storage, using
//! one process-wide 32-byte key taken from configuration. Every encryption
//! draws a fresh random iv; the GCM tag makes tampered or foreign records fail
//! loudly instead of decrypting to garbage.

pub mod crypto;
pub mod prompt;
pub mod store;
pub mod vault;

pub use prompt::read_secret_value;
pub use store::{CredentialStore, SocialCredentials, SocialCredentialsUpdate};
pub use vault::{mask_secret, CredentialVault, EncryptionKey, SealedSecret};
