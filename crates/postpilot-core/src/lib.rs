// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Postpilot.
//!
//! Foundational trait definitions, the error taxonomy, and the types shared
//! between the vault, storage, and gateway crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::PostpilotError;
pub use types::{
    AdapterType, AuthIdentity, AuthToken, HealthStatus, SecretRecord, SecretSlot, UserId,
};

pub use traits::{AuthAdapter, PluginAdapter, StorageAdapter};
