// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication adapter trait for identity verification.

use async_trait::async_trait;

use crate::error::PostpilotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AuthIdentity, AuthToken};

/// Adapter for resolving a presented token to a verified identity.
///
/// Postpilot never manages sessions itself; an auth adapter fronts whatever
/// identity provider issued the token.
#[async_trait]
pub trait AuthAdapter: PluginAdapter {
    /// Authenticates the given token and returns the verified identity.
    ///
    /// Returns [`PostpilotError::Unauthorized`] for unknown tokens.
    async fn authenticate(&self, token: AuthToken) -> Result<AuthIdentity, PostpilotError>;
}
