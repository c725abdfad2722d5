// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests for the credential configuration API.

use axum::http::{Method, StatusCode};
use postpilot_core::{SecretSlot, UserId};
use postpilot_test_utils::TestHarness;
use serde_json::json;
use tracing_test::traced_test;

async fn harness() -> TestHarness {
    TestHarness::builder()
        .with_user("tok-alice", "alice")
        .with_user("tok-bob", "bob")
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn missing_token_is_rejected_on_both_endpoints() {
    let h = harness().await;

    let (status, body) = h.request(Method::GET, "/api/config", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));

    let (status, _) = h
        .request(
            Method::POST,
            "/api/config",
            None,
            Some(json!({"facebookApiKey": "fb"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(h.memory.as_ref().unwrap().is_empty().await);
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let h = harness().await;
    let (status, body) = h
        .request(Method::GET, "/api/config", Some("tok-mallory"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn no_configured_tokens_rejects_everything() {
    let h = TestHarness::builder().build().await.unwrap();
    let (status, _) = h
        .request(Method::GET, "/api/config", Some("anything"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_before_any_save_returns_empty_strings() {
    let h = harness().await;
    let (status, body) = h
        .request(Method::GET, "/api/config", Some("tok-alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"facebookApiKey": "", "instagramApiKey": "", "linkedinApiKey": ""})
    );
}

#[tokio::test]
async fn post_echoes_submitted_values_and_get_returns_them() {
    let h = harness().await;
    let (status, body) = h
        .request(
            Method::POST,
            "/api/config",
            Some("tok-alice"),
            Some(json!({"facebookApiKey": "fb-1", "linkedinApiKey": "li-1"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"facebookApiKey": "fb-1", "instagramApiKey": "", "linkedinApiKey": "li-1"})
    );

    let (status, body) = h
        .request(Method::GET, "/api/config", Some("tok-alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["facebookApiKey"], "fb-1");
    assert_eq!(body["linkedinApiKey"], "li-1");
}

#[tokio::test]
async fn each_token_only_sees_its_own_user() {
    let h = harness().await;
    h.request(
        Method::POST,
        "/api/config",
        Some("tok-alice"),
        Some(json!({"instagramApiKey": "alice-ig"})),
    )
    .await;

    let (_, bob) = h
        .request(Method::GET, "/api/config", Some("tok-bob"), None)
        .await;
    assert_eq!(bob["instagramApiKey"], "");
}

#[tokio::test]
#[traced_test]
async fn tampered_record_yields_opaque_500() {
    let h = harness().await;
    h.request(
        Method::POST,
        "/api/config",
        Some("tok-alice"),
        Some(json!({"facebookApiKey": "fb-secret-value"})),
    )
    .await;
    h.memory
        .as_ref()
        .unwrap()
        .tamper(&UserId::from("alice"), SecretSlot::FacebookApiKey, |r| {
            r.ciphertext[0] ^= 0x01
        })
        .await;

    let (status, body) = h
        .request(Method::GET, "/api/config", Some("tok-alice"), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch configuration"}));
    assert!(logs_contain("failed to fetch configuration"));
    assert!(logs_contain("decryption error"));
    assert!(!logs_contain("fb-secret-value"));
}

#[tokio::test]
async fn storage_failure_yields_opaque_500_on_save() {
    let h = harness().await;
    h.memory.as_ref().unwrap().set_fail_writes(true);
    let (status, body) = h
        .request(
            Method::POST,
            "/api/config",
            Some("tok-alice"),
            Some(json!({"facebookApiKey": "fb"})),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to save configuration"}));
}

#[tokio::test]
async fn malformed_payload_is_a_bad_request() {
    let h = harness().await;
    let (status, body) = h
        .request(
            Method::POST,
            "/api/config",
            Some("tok-alice"),
            Some(json!({"facebookApiKey": 42})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid configuration payload");
}

#[tokio::test]
async fn sqlite_backed_roundtrip() {
    let h = TestHarness::builder()
        .with_user("tok-alice", "alice")
        .with_sqlite()
        .build()
        .await
        .unwrap();
    h.request(
        Method::POST,
        "/api/config",
        Some("tok-alice"),
        Some(json!({"linkedinApiKey": "li-sqlite"})),
    )
    .await;
    let (status, body) = h
        .request(Method::GET, "/api/config", Some("tok-alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["linkedinApiKey"], "li-sqlite");
}
