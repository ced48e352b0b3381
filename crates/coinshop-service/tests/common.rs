//! Common test utilities for coinshop integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use axum_test::{TestResponse, TestServer};
use serde_json::json;

use coinshop_service::{create_router, AppState, ServiceConfig};
use coinshop_store::{AccountStore, SqlStore};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for arranging balances and checking rows.
    pub store: Arc<SqlStore>,
}

impl TestHarness {
    /// Create a new test harness with a fresh in-memory database.
    pub async fn new() -> Self {
        Self::with_config(Self::config()).await
    }

    /// Create a harness with a custom configuration.
    pub async fn with_config(config: ServiceConfig) -> Self {
        let store = Arc::new(
            SqlStore::in_memory()
                .await
                .expect("Failed to open in-memory store"),
        );

        let state = AppState::new(store.clone(), config).expect("Failed to build state");
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store }
    }

    /// The configuration every default harness uses.
    pub fn config() -> ServiceConfig {
        ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            database_url: "sqlite::memory:".into(),
            secret_key: "test-secret-key".into(),
            password_hash_memory_kib: 8,
            password_hash_iterations: 1,
            ..ServiceConfig::default()
        }
    }

    /// Raw login request.
    pub async fn auth(&self, username: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/auth")
            .json(&json!({ "username": username, "password": password }))
            .await
    }

    /// Log in (registering if needed) and return the bearer token.
    pub async fn login(&self, username: &str) -> String {
        let response = self.auth(username, "password").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        body["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Register `username` and set its balance.
    pub async fn user_with_balance(&self, username: &str, balance: i64) -> String {
        let token = self.login(username).await;

        let account = self
            .store
            .account_by_username(username)
            .await
            .unwrap()
            .unwrap();
        let changed = self
            .store
            .adjust_balance(account.id, balance - account.balance, 0)
            .await
            .unwrap();
        assert_eq!(changed, 1);

        token
    }

    /// Current balance of `username`, read straight from the store.
    pub async fn balance(&self, username: &str) -> i64 {
        self.store
            .account_by_username(username)
            .await
            .unwrap()
            .unwrap()
            .balance
    }

    /// `GET /api/info` for the token's owner.
    pub async fn info(&self, token: &str) -> TestResponse {
        self.server
            .get("/api/info")
            .add_header(AUTHORIZATION, bearer(token))
            .await
    }

    /// `POST /api/sendCoin`.
    pub async fn send_coin(&self, token: &str, to_user: &str, amount: i64) -> TestResponse {
        self.server
            .post("/api/sendCoin")
            .add_header(AUTHORIZATION, bearer(token))
            .json(&json!({ "toUser": to_user, "amount": amount }))
            .await
    }

    /// `GET /api/buy/{item}`.
    pub async fn buy(&self, token: &str, item: &str) -> TestResponse {
        self.server
            .get(&format!("/api/buy/{item}"))
            .add_header(AUTHORIZATION, bearer(token))
            .await
    }
}

/// The `authorization` header name.
pub const AUTHORIZATION: HeaderName = header::AUTHORIZATION;

/// A `Bearer` header value for `token`.
pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header value")
}

/// Assert the JSON error envelope carries `code`.
pub fn assert_error_code(response: &TestResponse, code: &str) {
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], code, "unexpected error body: {body}");
    assert!(body["errors"].is_string());
}
