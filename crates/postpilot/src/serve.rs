// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `postpilot serve` implementation.
//!
//! Builds the vault from configuration before anything else, so a missing or
//! mis-sized key stops the process before a socket is bound. Then it opens
//! storage, wires the gateway, and serves until SIGINT/SIGTERM.

use std::sync::Arc;

use postpilot_config::PostpilotConfig;
use postpilot_core::{PostpilotError, StorageAdapter};
use postpilot_gateway::{start_server, GatewayState, ServerConfig, StaticTokenAuth};
use postpilot_storage::SqliteStorage;
use postpilot_vault::{CredentialStore, CredentialVault};
use tracing::{info, warn};

/// Run the server with the given configuration.
pub async fn run_serve(config: PostpilotConfig) -> Result<(), PostpilotError> {
    init_tracing(&config.server.log_level);

    let vault = Arc::new(CredentialVault::from_config(&config.vault)?);
    info!("credential vault ready");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let auth = StaticTokenAuth::from_config(&config.auth);
    if auth.is_empty() {
        warn!("no auth tokens configured -- every API request will be rejected");
    }

    let state = GatewayState {
        store: CredentialStore::new(vault, storage.clone()),
        auth: Arc::new(auth),
    };

    let served = start_server(&ServerConfig::from(&config.gateway), state, shutdown_signal()).await;

    // Checkpoint runs even when the server failed to bind.
    let closed = storage.close().await;
    served?;
    closed?;
    info!("shutdown complete");
    Ok(())
}

/// Resolve on SIGINT (Ctrl+C) or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
        _ = terminate => info!("received SIGTERM, initiating shutdown"),
    }
}

/// Install the global fmt subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("postpilot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
