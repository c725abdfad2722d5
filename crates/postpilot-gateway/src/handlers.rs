// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles GET /health, GET /api/config, POST /api/config.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use postpilot_core::AuthIdentity;
use postpilot_vault::SocialCredentialsUpdate;
use serde::Serialize;

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/config
///
/// Returns the caller's decrypted credentials. Missing slots are `""`.
pub async fn get_config(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
) -> Response {
    match state.store.load(&identity.user_id).await {
        Ok(credentials) => (StatusCode::OK, Json(credentials)).into_response(),
        Err(e) => {
            tracing::error!(user_id = %identity.user_id, error = %e, "failed to fetch configuration");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch configuration")
        }
    }
}

/// POST /api/config
///
/// Encrypts and stores every non-empty submitted slot, then echoes the
/// submitted values.
pub async fn post_config(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    body: Result<Json<SocialCredentialsUpdate>, JsonRejection>,
) -> Response {
    let Json(update) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(user_id = %identity.user_id, error = %rejection, "rejected configuration payload");
            return error_response(StatusCode::BAD_REQUEST, "Invalid configuration payload");
        }
    };

    match state.store.save(&identity.user_id, &update).await {
        Ok(saved) => (StatusCode::OK, Json(saved)).into_response(),
        Err(e) => {
            tracing::error!(user_id = %identity.user_id, error = %e, "failed to save configuration");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save configuration")
        }
    }
}
