//! Coin transfer integration tests.

mod common;

use axum::http::StatusCode;
use common::{assert_error_code, bearer, TestHarness, AUTHORIZATION};
use serde_json::json;

#[tokio::test]
async fn transfer_moves_coins_between_accounts() {
    let harness = TestHarness::new().await;
    let a = harness.user_with_balance("a", 500).await;
    let b = harness.user_with_balance("b", 100).await;

    harness.send_coin(&a, "b", 100).await.assert_status_ok();

    assert_eq!(harness.balance("a").await, 400);
    assert_eq!(harness.balance("b").await, 200);

    let a_info: serde_json::Value = harness.info(&a).await.json();
    assert_eq!(
        a_info["coinHistory"]["sent"],
        json!([{ "toUser": "b", "amount": 100 }])
    );

    let b_info: serde_json::Value = harness.info(&b).await.json();
    assert_eq!(
        b_info["coinHistory"]["received"],
        json!([{ "fromUser": "a", "amount": 100 }])
    );
}

#[tokio::test]
async fn transfer_beyond_balance_is_rejected_without_changes() {
    let harness = TestHarness::new().await;
    let a = harness.user_with_balance("a", 50).await;
    harness.user_with_balance("b", 0).await;

    let response = harness.send_coin(&a, "b", 100).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error_code(&response, "insufficient_funds");
    assert_eq!(harness.balance("a").await, 50);
    assert_eq!(harness.balance("b").await, 0);
}

#[tokio::test]
async fn transfer_to_unknown_user_is_rejected() {
    let harness = TestHarness::new().await;
    let a = harness.user_with_balance("a", 50).await;

    let response = harness.send_coin(&a, "ghost", 10).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error_code(&response, "recipient_not_found");
    assert_eq!(harness.balance("a").await, 50);
}

#[tokio::test]
async fn transfer_to_self_is_rejected() {
    let harness = TestHarness::new().await;
    let a = harness.user_with_balance("a", 50).await;

    let response = harness.send_coin(&a, "a", 10).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error_code(&response, "bad_request");
    assert_eq!(harness.balance("a").await, 50);
}

#[tokio::test]
async fn non_positive_amounts_are_bad_requests() {
    let harness = TestHarness::new().await;
    let a = harness.user_with_balance("a", 50).await;
    harness.login("b").await;

    for amount in [0, -10] {
        let response = harness.send_coin(&a, "b", amount).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_code(&response, "bad_request");
    }
    assert_eq!(harness.balance("a").await, 50);
}

#[tokio::test]
async fn malformed_transfer_body_is_bad_request() {
    let harness = TestHarness::new().await;
    let a = harness.login("a").await;

    let response = harness
        .server
        .post("/api/sendCoin")
        .add_header(AUTHORIZATION, bearer(&a))
        .json(&json!({ "toUser": "b", "amount": "lots" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error_code(&response, "bad_request");
}

#[tokio::test]
async fn concurrent_drains_let_exactly_one_through() {
    let harness = TestHarness::new().await;
    let a = harness.user_with_balance("a", 250).await;
    harness.user_with_balance("b", 0).await;

    let responses =
        futures::future::join_all((0..10).map(|_| harness.send_coin(&a, "b", 250))).await;

    let ok = responses
        .iter()
        .filter(|r| r.status_code() == StatusCode::OK)
        .count();
    assert_eq!(ok, 1);

    for response in responses
        .iter()
        .filter(|r| r.status_code() != StatusCode::OK)
    {
        assert_error_code(response, "insufficient_funds");
    }

    assert_eq!(harness.balance("a").await, 0);
    assert_eq!(harness.balance("b").await, 250);
}

#[tokio::test]
async fn round_trip_restores_balances() {
    let harness = TestHarness::new().await;
    let a = harness.user_with_balance("a", 300).await;
    let b = harness.user_with_balance("b", 20).await;

    harness.send_coin(&a, "b", 120).await.assert_status_ok();
    harness.send_coin(&b, "a", 120).await.assert_status_ok();

    assert_eq!(harness.balance("a").await, 300);
    assert_eq!(harness.balance("b").await, 20);
}
