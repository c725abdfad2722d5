// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::PostpilotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{SecretRecord, SecretSlot, UserId};

/// Adapter for persisting encrypted secret records.
///
/// Implementations store `ciphertext` and `iv` side by side and must return
/// them together. They never see plaintext.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), PostpilotError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), PostpilotError>;

    /// Inserts or overwrites every record in one transaction, keyed by
    /// `(user_id, slot)`. Either all records are written or none are.
    async fn upsert_secrets(&self, records: &[SecretRecord]) -> Result<(), PostpilotError>;

    /// Inserts a record or overwrites the existing one for `(user_id, slot)`.
    async fn upsert_secret(&self, record: &SecretRecord) -> Result<(), PostpilotError> {
        self.upsert_secrets(std::slice::from_ref(record)).await
    }

    /// Fetches the record for one slot of one user.
    async fn get_secret(
        &self,
        user_id: &UserId,
        slot: SecretSlot,
    ) -> Result<Option<SecretRecord>, PostpilotError>;

    /// Lists every record owned by a user, ordered by slot name.
    async fn list_secrets(&self, user_id: &UserId) -> Result<Vec<SecretRecord>, PostpilotError>;

    /// Deletes every record owned by a user. Returns the number of rows removed.
    async fn delete_user_secrets(&self, user_id: &UserId) -> Result<usize, PostpilotError>;
}
