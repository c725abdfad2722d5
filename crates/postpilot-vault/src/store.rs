// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user credential configuration on top of the vault and a storage adapter.
//!
//! Only sealed records ever reach the storage adapter. Plaintext lives in
//! [`SocialCredentials`] values, which wipe themselves on drop.

use std::sync::Arc;

use chrono::Utc;
use postpilot_core::{PostpilotError, SecretRecord, SecretSlot, StorageAdapter, UserId};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::vault::{mask_secret, CredentialVault, SealedSecret};

/// A user's decrypted credentials. Missing slots are empty strings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct SocialCredentials {
    pub facebook_api_key: String,
    pub instagram_api_key: String,
    pub linkedin_api_key: String,
}

impl std::fmt::Debug for SocialCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialCredentials")
            .field("facebook_api_key", &"[REDACTED]")
            .field("instagram_api_key", &"[REDACTED]")
            .field("linkedin_api_key", &"[REDACTED]")
            .finish()
    }
}

impl SocialCredentials {
    pub fn get(&self, slot: SecretSlot) -> &str {
        match slot {
            SecretSlot::FacebookApiKey => &self.facebook_api_key,
            SecretSlot::InstagramApiKey => &self.instagram_api_key,
            SecretSlot::LinkedinApiKey => &self.linkedin_api_key,
        }
    }

    fn slot_mut(&mut self, slot: SecretSlot) -> &mut String {
        match slot {
            SecretSlot::FacebookApiKey => &mut self.facebook_api_key,
            SecretSlot::InstagramApiKey => &mut self.instagram_api_key,
            SecretSlot::LinkedinApiKey => &mut self.linkedin_api_key,
        }
    }

    pub fn set(&mut self, slot: SecretSlot, value: impl Into<String>) {
        let field = self.slot_mut(slot);
        field.zeroize();
        *field = value.into();
    }
}

/// A submitted credential update. Absent or empty slots are left untouched.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct SocialCredentialsUpdate {
    pub facebook_api_key: Option<String>,
    pub instagram_api_key: Option<String>,
    pub linkedin_api_key: Option<String>,
}

impl std::fmt::Debug for SocialCredentialsUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        f.debug_struct("SocialCredentialsUpdate")
            .field("facebook_api_key", &present(&self.facebook_api_key))
            .field("instagram_api_key", &present(&self.instagram_api_key))
            .field("linkedin_api_key", &present(&self.linkedin_api_key))
            .finish()
    }
}

impl SocialCredentialsUpdate {
    /// The submitted value for `slot`, or `None` when absent or empty.
    pub fn get(&self, slot: SecretSlot) -> Option<&str> {
        let value = match slot {
            SecretSlot::FacebookApiKey => &self.facebook_api_key,
            SecretSlot::InstagramApiKey => &self.instagram_api_key,
            SecretSlot::LinkedinApiKey => &self.linkedin_api_key,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn with(mut self, slot: SecretSlot, value: impl Into<String>) -> Self {
        let field = match slot {
            SecretSlot::FacebookApiKey => &mut self.facebook_api_key,
            SecretSlot::InstagramApiKey => &mut self.instagram_api_key,
            SecretSlot::LinkedinApiKey => &mut self.linkedin_api_key,
        };
        *field = Some(value.into());
        self
    }
}

/// Reads and writes a user's credentials, encrypting on the way in and
/// decrypting on the way out.
#[derive(Clone)]
pub struct CredentialStore {
    vault: Arc<CredentialVault>,
    storage: Arc<dyn StorageAdapter>,
}

impl CredentialStore {
    pub fn new(vault: Arc<CredentialVault>, storage: Arc<dyn StorageAdapter>) -> Self {
        Self { vault, storage }
    }

    /// Decrypt every stored slot for `user_id`.
    ///
    /// A slot that fails to decrypt fails the whole load.
    pub async fn load(&self, user_id: &UserId) -> Result<SocialCredentials, PostpilotError> {
        let records = self.storage.list_secrets(user_id).await?;

        let mut credentials = SocialCredentials::default();
        for record in records {
            let slot = record.slot;
            let plaintext = self.open_record(record).inspect_err(|e| {
                warn!(user_id = %user_id, slot = %slot, error = %e, "stored credential failed to decrypt");
            })?;
            credentials.set(slot, plaintext.expose_secret());
        }

        debug!(user_id = %user_id, "credentials loaded");
        Ok(credentials)
    }

    /// Encrypt and persist every non-empty slot of `update` in one write.
    ///
    /// Returns the submitted values, with absent slots as empty strings.
    pub async fn save(
        &self,
        user_id: &UserId,
        update: &SocialCredentialsUpdate,
    ) -> Result<SocialCredentials, PostpilotError> {
        let mut submitted = SocialCredentials::default();
        let mut records = Vec::new();
        for slot in SecretSlot::iter() {
            if let Some(value) = update.get(slot) {
                records.push(self.seal_record(user_id, slot, value)?);
                submitted.set(slot, value);
            }
        }

        if !records.is_empty() {
            self.storage.upsert_secrets(&records).await?;
        }

        info!(user_id = %user_id, slots = records.len(), "credentials saved");
        Ok(submitted)
    }

    /// Encrypt and persist a single slot.
    pub async fn set_secret(
        &self,
        user_id: &UserId,
        slot: SecretSlot,
        plaintext: &str,
    ) -> Result<(), PostpilotError> {
        let record = self.seal_record(user_id, slot, plaintext)?;
        let replaced = self.storage.get_secret(user_id, slot).await?.is_some();
        self.storage.upsert_secret(&record).await?;
        info!(user_id = %user_id, slot = %slot, replaced, "credential stored");
        Ok(())
    }

    /// Stored slots for `user_id` with masked previews.
    ///
    /// A slot that fails to decrypt is listed with an error marker instead of
    /// failing the listing.
    pub async fn list_masked(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<(SecretSlot, String)>, PostpilotError> {
        let records = self.storage.list_secrets(user_id).await?;
        let mut result = Vec::with_capacity(records.len());
        for record in records {
            let slot = record.slot;
            match self.open_record(record) {
                Ok(plaintext) => result.push((slot, mask_secret(plaintext.expose_secret()))),
                Err(_) => result.push((slot, "[error: could not decrypt]".to_string())),
            }
        }
        Ok(result)
    }

    /// Remove every stored slot for `user_id`. Returns the number removed.
    pub async fn delete_user(&self, user_id: &UserId) -> Result<usize, PostpilotError> {
        let removed = self.storage.delete_user_secrets(user_id).await?;
        info!(user_id = %user_id, removed, "user credentials deleted");
        Ok(removed)
    }

    fn seal_record(
        &self,
        user_id: &UserId,
        slot: SecretSlot,
        plaintext: &str,
    ) -> Result<SecretRecord, PostpilotError> {
        let SealedSecret { ciphertext, iv } = self.vault.encrypt(plaintext)?;
        Ok(SecretRecord {
            user_id: user_id.clone(),
            slot,
            ciphertext,
            iv,
            updated_at: Utc::now().to_rfc3339(),
        })
    }

    fn open_record(&self, record: SecretRecord) -> Result<secrecy::SecretString, PostpilotError> {
        self.vault.decrypt(&SealedSecret {
            ciphertext: record.ciphertext,
            iv: record.iv,
        })
    }
}
