// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication for the gateway.
//!
//! Requests carry `Authorization: Bearer <token>`. The token is resolved to an
//! [`AuthIdentity`] through the configured [`AuthAdapter`] and the identity is
//! inserted into request extensions for handlers to extract.
//!
//! When no tokens are configured, all requests are rejected (fail-closed).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use postpilot_config::model::AuthConfig;
use postpilot_core::{
    AdapterType, AuthAdapter, AuthIdentity, AuthToken, HealthStatus, PluginAdapter,
    PostpilotError, UserId,
};

use crate::handlers::ErrorResponse;

/// Auth adapter backed by the `[[auth.tokens]]` table.
pub struct StaticTokenAuth {
    tokens: HashMap<String, UserId>,
}

impl std::fmt::Debug for StaticTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenAuth")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl StaticTokenAuth {
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|t| (t.token.clone(), UserId(t.user_id.clone())))
            .collect();
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl PluginAdapter for StaticTokenAuth {
    fn name(&self) -> &str {
        "static-token"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Auth
    }

    async fn health_check(&self) -> Result<HealthStatus, PostpilotError> {
        if self.tokens.is_empty() {
            return Ok(HealthStatus::Degraded(
                "no tokens configured, all requests rejected".to_string(),
            ));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PostpilotError> {
        Ok(())
    }
}

#[async_trait]
impl AuthAdapter for StaticTokenAuth {
    async fn authenticate(&self, token: AuthToken) -> Result<AuthIdentity, PostpilotError> {
        self.tokens
            .get(&token.0)
            .map(|user_id| AuthIdentity {
                user_id: user_id.clone(),
            })
            .ok_or(PostpilotError::Unauthorized)
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Unauthorized".to_string(),
        }),
    )
        .into_response()
}

/// Middleware that resolves the bearer token to an identity.
pub async fn auth_middleware(
    State(auth): State<Arc<dyn AuthAdapter>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| AuthToken(t.trim().to_string()));

    let Some(token) = token else {
        tracing::debug!("request rejected: missing bearer token");
        return unauthorized();
    };

    match auth.authenticate(token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(PostpilotError::Unauthorized) => {
            tracing::debug!("request rejected: unknown bearer token");
            unauthorized()
        }
        Err(e) => {
            tracing::error!(error = %e, "auth adapter failed");
            unauthorized()
        }
    }
}
