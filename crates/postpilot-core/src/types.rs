// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Opaque identifier of a user, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Named credential field held per user.
///
/// The string form is the camelCase name used in request payloads and in the
/// `slot` column of `credential_secrets`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum SecretSlot {
    #[strum(serialize = "facebookApiKey")]
    #[serde(rename = "facebookApiKey")]
    FacebookApiKey,
    #[strum(serialize = "instagramApiKey")]
    #[serde(rename = "instagramApiKey")]
    InstagramApiKey,
    #[strum(serialize = "linkedinApiKey")]
    #[serde(rename = "linkedinApiKey")]
    LinkedinApiKey,
}

/// An encrypted secret as handed to the storage collaborator.
///
/// `ciphertext` and `iv` travel together; one is useless without the other.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub user_id: UserId,
    pub slot: SecretSlot,
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
    /// ISO 8601 timestamp of the last write.
    pub updated_at: String,
}

impl std::fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRecord")
            .field("user_id", &self.user_id)
            .field("slot", &self.slot)
            .field("ciphertext_len", &self.ciphertext.len())
            .field("iv_len", &self.iv.len())
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Auth,
}

/// A bearer token presented by a caller.
#[derive(Clone)]
pub struct AuthToken(pub String);

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([redacted])")
    }
}

/// A verified identity returned by an auth adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub user_id: UserId,
}
