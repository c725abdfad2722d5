// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::get,
    Router,
};
use postpilot_core::{AuthAdapter, PostpilotError};
use postpilot_vault::CredentialStore;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Encrypting credential store.
    pub store: CredentialStore,
    /// Resolves bearer tokens to identities.
    pub auth: Arc<dyn AuthAdapter>,
}

/// Gateway server configuration (mirrors GatewayConfig from postpilot-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&postpilot_config::model::GatewayConfig> for ServerConfig {
    fn from(config: &postpilot_config::model::GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Build the application router:
/// - GET /health (public)
/// - GET /api/config (with auth)
/// - POST /api/config (with auth)
pub fn build_router(state: GatewayState) -> Router {
    let public_routes: Router = Router::new().route("/health", get(handlers::get_health));

    let api_routes = Router::new()
        .route(
            "/api/config",
            get(handlers::get_config).post(handlers::post_config),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
}

/// Bind to the configured host:port and serve until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), PostpilotError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PostpilotError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| PostpilotError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
