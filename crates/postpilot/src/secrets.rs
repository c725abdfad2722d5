// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands for stored credentials: `gen-key`, `set-secret`,
//! `list-secrets`, `delete-user`.

use std::sync::Arc;

use postpilot_config::PostpilotConfig;
use postpilot_core::{PostpilotError, SecretSlot, StorageAdapter, UserId};
use postpilot_storage::SqliteStorage;
use postpilot_vault::{crypto, read_secret_value, CredentialStore, CredentialVault};
use secrecy::ExposeSecret;

/// Open storage and the vault the same way `serve` does.
async fn open_store(
    config: &PostpilotConfig,
) -> Result<(CredentialStore, Arc<SqliteStorage>), PostpilotError> {
    let vault = Arc::new(CredentialVault::from_config(&config.vault)?);
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    Ok((CredentialStore::new(vault, storage.clone()), storage))
}

/// Print a random 32-character alphanumeric key.
pub fn run_gen_key() -> Result<(), PostpilotError> {
    let key = crypto::generate_key_string()?;
    println!("{}", key.as_str());
    Ok(())
}

/// Read a value from the prompt (or env) and store it encrypted.
pub async fn run_set_secret(
    config: &PostpilotConfig,
    user: &str,
    slot: SecretSlot,
) -> Result<(), PostpilotError> {
    let (store, storage) = open_store(config).await?;
    let value = read_secret_value(slot)?;
    store
        .set_secret(&UserId::from(user), slot, value.expose_secret())
        .await?;
    storage.close().await?;
    println!("Stored {slot} for {user}.");
    Ok(())
}

/// Print a user's stored slots with masked previews.
pub async fn run_list_secrets(config: &PostpilotConfig, user: &str) -> Result<(), PostpilotError> {
    let (store, storage) = open_store(config).await?;
    let listed = store.list_masked(&UserId::from(user)).await?;
    storage.close().await?;

    if listed.is_empty() {
        println!("No secrets stored for {user}.");
        return Ok(());
    }
    for (slot, preview) in listed {
        println!("{:<16} {preview}", slot.to_string());
    }
    Ok(())
}

/// Delete every stored slot of a user.
pub async fn run_delete_user(config: &PostpilotConfig, user: &str) -> Result<(), PostpilotError> {
    let (store, storage) = open_store(config).await?;
    let removed = store.delete_user(&UserId::from(user)).await?;
    storage.close().await?;
    println!("Deleted {removed} secret(s) for {user}.");
    Ok(())
}
