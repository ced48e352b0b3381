//! Login and token integration tests.

mod common;

use axum::http::{HeaderValue, StatusCode};
use common::{assert_error_code, bearer, TestHarness, AUTHORIZATION};
use serde_json::json;

use coinshop_core::STARTING_BALANCE;
use coinshop_service::{AppState, ServiceConfig};
use coinshop_store::{AccountStore, SqlStore};

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn first_login_registers_with_starting_balance() {
    let harness = TestHarness::new().await;

    let token = harness.login("alice").await;
    assert!(!token.is_empty());

    assert_eq!(harness.balance("alice").await, STARTING_BALANCE);
}

#[tokio::test]
async fn second_login_with_same_password_succeeds() {
    let harness = TestHarness::new().await;
    harness.login("alice").await;

    let response = harness.auth("alice", "password").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let harness = TestHarness::new().await;
    harness.login("alice").await;

    let response = harness.auth("alice", "not-the-password").await;

    response.assert_status_unauthorized();
    assert_error_code(&response, "unauthorized");
}

#[tokio::test]
async fn invalid_credentials_syntax_is_bad_request() {
    let harness = TestHarness::new().await;

    for (username, password) in [("", "pw"), ("has space", "pw"), ("bob", "")] {
        let response = harness.auth(username, password).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_code(&response, "bad_request");
    }

    let response = harness.auth(&"x".repeat(101), "pw").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/api/auth")
        .json(&json!({ "username": "alice" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error_code(&response, "bad_request");
}

#[tokio::test]
async fn stored_credential_is_an_argon2id_digest() {
    let harness = TestHarness::new().await;
    harness.login("alice").await;

    let account = harness
        .store
        .account_by_username("alice")
        .await
        .unwrap()
        .unwrap();

    assert!(account.credential_hash.starts_with("$argon2id$"));
    assert!(!account.credential_hash.contains("password"));
}

#[tokio::test]
async fn unusable_hash_cost_fails_startup() {
    let store = std::sync::Arc::new(SqlStore::in_memory().await.unwrap());
    let config = ServiceConfig {
        password_hash_memory_kib: 0,
        ..TestHarness::config()
    };

    assert!(AppState::new(store, config).is_err());
}

#[tokio::test]
async fn racing_first_logins_create_one_account() {
    let harness = TestHarness::new().await;

    let responses =
        futures::future::join_all((0..6).map(|_| harness.auth("carol", "password"))).await;

    for response in &responses {
        response.assert_status_ok();
    }
    assert_eq!(harness.balance("carol").await, STARTING_BALANCE);
}

// ============================================================================
// Token checks
// ============================================================================

#[tokio::test]
async fn protected_routes_require_a_token() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/api/info").await;
    response.assert_status_unauthorized();
    assert_error_code(&response, "unauthorized");

    harness
        .server
        .get("/api/buy/cup")
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn garbage_and_foreign_tokens_are_rejected() {
    let harness = TestHarness::new().await;

    harness
        .server
        .get("/api/info")
        .add_header(AUTHORIZATION, bearer("not-a-jwt"))
        .await
        .assert_status_unauthorized();

    let other = TestHarness::with_config(ServiceConfig {
        secret_key: "a-different-secret".into(),
        ..TestHarness::config()
    })
    .await;
    let foreign = other.login("alice").await;

    harness.info(&foreign).await.assert_status_unauthorized();
}

#[tokio::test]
async fn token_without_bearer_prefix_is_rejected() {
    let harness = TestHarness::new().await;
    let token = harness.login("alice").await;

    harness
        .server
        .get("/api/info")
        .add_header(AUTHORIZATION, HeaderValue::from_str(&token).unwrap())
        .await
        .assert_status_unauthorized();
}
