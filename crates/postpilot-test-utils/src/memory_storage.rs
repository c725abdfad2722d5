// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage adapter for deterministic testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use postpilot_core::{
    AdapterType, HealthStatus, PluginAdapter, PostpilotError, SecretRecord, SecretSlot,
    StorageAdapter, UserId,
};
use tokio::sync::RwLock;

type Key = (String, SecretSlot);

/// Storage adapter that keeps records in a map.
///
/// Writes can be made to fail on demand, and stored records can be tampered
/// with directly to exercise the decryption failure paths.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<BTreeMap<Key, SecretRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Apply `f` to a stored record in place. Returns `false` if absent.
    pub async fn tamper(
        &self,
        user_id: &UserId,
        slot: SecretSlot,
        f: impl FnOnce(&mut SecretRecord),
    ) -> bool {
        let mut records = self.records.write().await;
        match records.get_mut(&(user_id.as_str().to_string(), slot)) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    /// Total number of stored records across all users.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PostpilotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PostpilotError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), PostpilotError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), PostpilotError> {
        Ok(())
    }

    async fn upsert_secrets(&self, records: &[SecretRecord]) -> Result<(), PostpilotError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PostpilotError::Storage {
                source: "memory storage configured to fail writes".into(),
            });
        }
        let mut map = self.records.write().await;
        for record in records {
            map.insert(
                (record.user_id.as_str().to_string(), record.slot),
                record.clone(),
            );
        }
        Ok(())
    }

    async fn get_secret(
        &self,
        user_id: &UserId,
        slot: SecretSlot,
    ) -> Result<Option<SecretRecord>, PostpilotError> {
        let map = self.records.read().await;
        Ok(map.get(&(user_id.as_str().to_string(), slot)).cloned())
    }

    async fn list_secrets(&self, user_id: &UserId) -> Result<Vec<SecretRecord>, PostpilotError> {
        let map = self.records.read().await;
        Ok(map
            .iter()
            .filter(|((owner, _), _)| owner == user_id.as_str())
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn delete_user_secrets(&self, user_id: &UserId) -> Result<usize, PostpilotError> {
        let mut map = self.records.write().await;
        let before = map.len();
        map.retain(|(owner, _), _| owner != user_id.as_str());
        Ok(before - map.len())
    }
}
