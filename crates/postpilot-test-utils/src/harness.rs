// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full credential stack: a vault with a random
//! key, an in-memory or temp SQLite storage backend, the credential store,
//! and the gateway router with static token auth. Provides `request()` to
//! drive the router without binding a socket.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use postpilot_config::model::{AuthConfig, StorageConfig, TokenConfig};
use postpilot_core::{PostpilotError, StorageAdapter};
use postpilot_gateway::{build_router, GatewayState, StaticTokenAuth};
use postpilot_storage::SqliteStorage;
use postpilot_vault::{CredentialStore, CredentialVault, EncryptionKey};
use tower::ServiceExt;

use crate::memory_storage::MemoryStorage;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    tokens: Vec<TokenConfig>,
    sqlite: bool,
    key: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            sqlite: false,
            key: None,
        }
    }

    /// Register a bearer token that authenticates as `user_id`.
    pub fn with_user(mut self, token: &str, user_id: &str) -> Self {
        self.tokens.push(TokenConfig {
            token: token.to_string(),
            user_id: user_id.to_string(),
        });
        self
    }

    /// Back the harness with a temp SQLite database instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Use a fixed key instead of a random one. Must be 32 bytes.
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, PostpilotError> {
        let key = match &self.key {
            Some(value) => EncryptionKey::from_config_value(value)?,
            None => EncryptionKey::generate()?,
        };
        let vault = Arc::new(CredentialVault::new(key)?);

        let (storage, memory, temp_dir, database_path): (
            Arc<dyn StorageAdapter>,
            Option<Arc<MemoryStorage>>,
            Option<tempfile::TempDir>,
            Option<PathBuf>,
        ) = if self.sqlite {
            let temp_dir =
                tempfile::TempDir::new().map_err(|e| PostpilotError::Storage { source: e.into() })?;
            let db_path = temp_dir.path().join("test.db");
            let storage = SqliteStorage::new(StorageConfig {
                database_path: db_path.to_string_lossy().into_owned(),
                wal_mode: true,
            });
            storage.initialize().await?;
            let storage: Arc<dyn StorageAdapter> = Arc::new(storage);
            (storage, None, Some(temp_dir), Some(db_path))
        } else {
            let memory = Arc::new(MemoryStorage::new());
            let storage: Arc<dyn StorageAdapter> = memory.clone();
            (storage, Some(memory), None, None)
        };

        let store = CredentialStore::new(vault.clone(), storage.clone());
        let auth = StaticTokenAuth::from_config(&AuthConfig {
            tokens: self.tokens,
        });
        let router = build_router(GatewayState {
            store: store.clone(),
            auth: Arc::new(auth),
        });

        Ok(TestHarness {
            vault,
            storage,
            memory,
            store,
            router,
            database_path,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment.
pub struct TestHarness {
    pub vault: Arc<CredentialVault>,
    pub storage: Arc<dyn StorageAdapter>,
    /// Set when the harness runs on [`MemoryStorage`].
    pub memory: Option<Arc<MemoryStorage>>,
    pub store: CredentialStore,
    router: Router,
    database_path: Option<PathBuf>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Path of the SQLite file, when built with [`TestHarnessBuilder::with_sqlite`].
    pub fn database_path(&self) -> Option<&PathBuf> {
        self.database_path.as_ref()
    }

    /// Send one request through the router and decode the JSON response.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }
}
