// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential store behaviour over in-memory storage.

use std::sync::Arc;

use postpilot_core::{PostpilotError, SecretSlot, StorageAdapter, UserId};
use postpilot_test_utils::MemoryStorage;
use postpilot_vault::{CredentialStore, CredentialVault, EncryptionKey, SocialCredentialsUpdate};
use tracing_test::traced_test;

fn setup() -> (CredentialStore, Arc<MemoryStorage>) {
    let vault = Arc::new(CredentialVault::new(EncryptionKey::generate().unwrap()).unwrap());
    let storage = Arc::new(MemoryStorage::new());
    (CredentialStore::new(vault, storage.clone()), storage)
}

#[tokio::test]
async fn load_of_unknown_user_is_all_empty() {
    let (store, _) = setup();
    let creds = store.load(&UserId::from("nobody")).await.unwrap();
    assert_eq!(creds.facebook_api_key, "");
    assert_eq!(creds.instagram_api_key, "");
    assert_eq!(creds.linkedin_api_key, "");
}

#[tokio::test]
async fn save_then_load_roundtrips() {
    let (store, storage) = setup();
    let user = UserId::from("alice");
    let update = SocialCredentialsUpdate::default()
        .with(SecretSlot::FacebookApiKey, "fb-123")
        .with(SecretSlot::LinkedinApiKey, "li-456");

    let saved = store.save(&user, &update).await.unwrap();
    assert_eq!(saved.facebook_api_key, "fb-123");
    assert_eq!(saved.instagram_api_key, "");

    let loaded = store.load(&user).await.unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(storage.len().await, 2);
}

#[tokio::test]
async fn stored_bytes_are_not_plaintext() {
    let (store, storage) = setup();
    let user = UserId::from("alice");
    store
        .set_secret(&user, SecretSlot::InstagramApiKey, "ig-plaintext-value")
        .await
        .unwrap();

    let record = storage
        .get_secret(&user, SecretSlot::InstagramApiKey)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.iv.len(), 12);
    let needle = b"ig-plaintext-value";
    assert!(!record.ciphertext.windows(needle.len()).any(|w| w == needle));
}

#[tokio::test]
async fn empty_and_absent_slots_are_left_unchanged() {
    let (store, _) = setup();
    let user = UserId::from("alice");
    store
        .save(
            &user,
            &SocialCredentialsUpdate::default()
                .with(SecretSlot::FacebookApiKey, "fb-old")
                .with(SecretSlot::InstagramApiKey, "ig-old"),
        )
        .await
        .unwrap();

    // facebook submitted empty, instagram absent, linkedin new.
    let saved = store
        .save(
            &user,
            &SocialCredentialsUpdate::default()
                .with(SecretSlot::FacebookApiKey, "")
                .with(SecretSlot::LinkedinApiKey, "li-new"),
        )
        .await
        .unwrap();
    assert_eq!(saved.facebook_api_key, "");
    assert_eq!(saved.linkedin_api_key, "li-new");

    let loaded = store.load(&user).await.unwrap();
    assert_eq!(loaded.facebook_api_key, "fb-old");
    assert_eq!(loaded.instagram_api_key, "ig-old");
    assert_eq!(loaded.linkedin_api_key, "li-new");
}

#[tokio::test]
async fn save_overwrites_with_fresh_iv() {
    let (store, storage) = setup();
    let user = UserId::from("alice");
    store.set_secret(&user, SecretSlot::FacebookApiKey, "first").await.unwrap();
    let first = storage
        .get_secret(&user, SecretSlot::FacebookApiKey)
        .await
        .unwrap()
        .unwrap();

    store.set_secret(&user, SecretSlot::FacebookApiKey, "second").await.unwrap();
    let second = storage
        .get_secret(&user, SecretSlot::FacebookApiKey)
        .await
        .unwrap()
        .unwrap();

    assert_ne!(first.iv, second.iv);
    assert_eq!(storage.len().await, 1);
    assert_eq!(store.load(&user).await.unwrap().facebook_api_key, "second");
}

#[tokio::test]
async fn users_never_see_each_other() {
    let (store, _) = setup();
    let alice = UserId::from("alice");
    let bob = UserId::from("bob");
    store.set_secret(&alice, SecretSlot::FacebookApiKey, "alice-fb").await.unwrap();
    store.set_secret(&bob, SecretSlot::LinkedinApiKey, "bob-li").await.unwrap();

    let a = store.load(&alice).await.unwrap();
    let b = store.load(&bob).await.unwrap();
    assert_eq!(a.facebook_api_key, "alice-fb");
    assert_eq!(a.linkedin_api_key, "");
    assert_eq!(b.facebook_api_key, "");
    assert_eq!(b.linkedin_api_key, "bob-li");
}

#[tokio::test]
async fn tampered_record_fails_the_whole_load() {
    let (store, storage) = setup();
    let user = UserId::from("alice");
    store
        .save(
            &user,
            &SocialCredentialsUpdate::default()
                .with(SecretSlot::FacebookApiKey, "fb-ok")
                .with(SecretSlot::LinkedinApiKey, "li-broken"),
        )
        .await
        .unwrap();
    assert!(storage
        .tamper(&user, SecretSlot::LinkedinApiKey, |r| r.ciphertext[0] ^= 0x01)
        .await);

    let err = store.load(&user).await.unwrap_err();
    assert!(matches!(err, PostpilotError::Decryption(_)));
}

#[tokio::test]
async fn records_from_another_key_fail_to_load() {
    let storage = Arc::new(MemoryStorage::new());
    let user = UserId::from("alice");
    let writer = CredentialStore::new(
        Arc::new(CredentialVault::new(EncryptionKey::generate().unwrap()).unwrap()),
        storage.clone(),
    );
    let reader = CredentialStore::new(
        Arc::new(CredentialVault::new(EncryptionKey::generate().unwrap()).unwrap()),
        storage,
    );

    writer.set_secret(&user, SecretSlot::FacebookApiKey, "fb").await.unwrap();
    assert!(reader.load(&user).await.unwrap_err().is_crypto());
}

#[tokio::test]
async fn storage_failure_on_save_propagates() {
    let (store, storage) = setup();
    storage.set_fail_writes(true);
    let err = store
        .save(
            &UserId::from("alice"),
            &SocialCredentialsUpdate::default().with(SecretSlot::FacebookApiKey, "fb"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PostpilotError::Storage { .. }));
}

#[tokio::test]
async fn save_with_nothing_submitted_writes_nothing() {
    let (store, storage) = setup();
    // A failing backend proves no write was attempted.
    storage.set_fail_writes(true);
    let saved = store
        .save(&UserId::from("alice"), &SocialCredentialsUpdate::default())
        .await
        .unwrap();
    assert_eq!(saved.facebook_api_key, "");
}

#[tokio::test]
async fn list_masked_marks_undecryptable_slots() {
    let (store, storage) = setup();
    let user = UserId::from("alice");
    store
        .set_secret(&user, SecretSlot::FacebookApiKey, "EAABsbCS1iHgBAxyz987")
        .await
        .unwrap();
    store.set_secret(&user, SecretSlot::InstagramApiKey, "short").await.unwrap();
    store.set_secret(&user, SecretSlot::LinkedinApiKey, "AQVlinkedin0001").await.unwrap();
    storage
        .tamper(&user, SecretSlot::LinkedinApiKey, |r| r.iv[0] ^= 0x01)
        .await;

    let listed = store.list_masked(&user).await.unwrap();
    assert_eq!(
        listed,
        vec![
            (SecretSlot::FacebookApiKey, "EAAB...z987".to_string()),
            (SecretSlot::InstagramApiKey, "****".to_string()),
            (SecretSlot::LinkedinApiKey, "[error: could not decrypt]".to_string()),
        ]
    );
}

#[tokio::test]
async fn delete_user_removes_only_their_records() {
    let (store, storage) = setup();
    let alice = UserId::from("alice");
    store.set_secret(&alice, SecretSlot::FacebookApiKey, "a1").await.unwrap();
    store.set_secret(&alice, SecretSlot::LinkedinApiKey, "a2").await.unwrap();
    store
        .set_secret(&UserId::from("bob"), SecretSlot::FacebookApiKey, "b1")
        .await
        .unwrap();

    assert_eq!(store.delete_user(&alice).await.unwrap(), 2);
    assert_eq!(storage.len().await, 1);
    assert_eq!(store.load(&alice).await.unwrap().facebook_api_key, "");
}

#[tokio::test]
async fn set_secret_rejects_empty_value() {
    let (store, storage) = setup();
    let err = store
        .set_secret(&UserId::from("alice"), SecretSlot::FacebookApiKey, "")
        .await
        .unwrap_err();
    assert!(matches!(err, PostpilotError::Internal(_)));
    assert!(storage.is_empty().await);
}

#[tokio::test]
#[traced_test]
async fn logs_carry_user_and_slot_but_never_values() {
    let (store, storage) = setup();
    let user = UserId::from("alice");
    store
        .save(
            &user,
            &SocialCredentialsUpdate::default().with(SecretSlot::FacebookApiKey, "fb-very-secret"),
        )
        .await
        .unwrap();
    storage
        .tamper(&user, SecretSlot::FacebookApiKey, |r| r.ciphertext[0] ^= 0x01)
        .await;
    let _ = store.load(&user).await;

    assert!(logs_contain("credentials saved"));
    assert!(logs_contain("stored credential failed to decrypt"));
    assert!(logs_contain("facebookApiKey"));
    assert!(!logs_contain("fb-very-secret"));
}

#[tokio::test]
#[traced_test]
async fn set_secret_logs_whether_a_value_was_replaced() {
    let (store, _) = setup();
    let user = UserId::from("alice");

    store.set_secret(&user, SecretSlot::LinkedinApiKey, "li-one").await.unwrap();
    assert!(logs_contain("replaced=false"));
    assert!(!logs_contain("replaced=true"));

    store.set_secret(&user, SecretSlot::LinkedinApiKey, "li-two").await.unwrap();
    assert!(logs_contain("replaced=true"));
    assert!(!logs_contain("li-two"));
}
