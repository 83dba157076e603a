//! Integration tests for the sign-up, sign-in, refresh, and sign-out flow.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use crate::helpers::TestApp;

const EMAIL: &str = "carol@example.com";
const PASSWORD: &str = "password123";

#[tokio::test]
async fn test_sign_up_returns_created_user() {
    let app = TestApp::new();

    let response = app.sign_up(EMAIL, PASSWORD).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["email"], EMAIL);
    assert!(response.body["data"]["id"].is_string());
    assert!(response.body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_sign_up_is_conflict() {
    let app = TestApp::new();
    app.sign_up(EMAIL, PASSWORD).await;

    let response = app.sign_up(EMAIL, PASSWORD).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
    assert_eq!(response.body["message"], "user already exists");
}

#[tokio::test]
async fn test_sign_up_validation() {
    let app = TestApp::new();

    let short = app.sign_up(EMAIL, "12345").await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(short.body["error"], "VALIDATION_ERROR");

    let bad_email = app.sign_up("carol-at-example", PASSWORD).await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_in_failures_are_identical() {
    let app = TestApp::new();
    app.sign_up(EMAIL, PASSWORD).await;

    let wrong_password = app
        .request(
            "/auth/sign-in",
            json!({ "email": EMAIL, "password": "wrong-password" }),
            "10.1.1.1",
        )
        .await;
    let unknown_user = app
        .request(
            "/auth/sign-in",
            json!({ "email": "nobody@example.com", "password": PASSWORD }),
            "10.1.1.1",
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::NOT_FOUND);
    assert_eq!(wrong_password.status, unknown_user.status);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_replay() {
    let app = TestApp::new();
    app.sign_up(EMAIL, PASSWORD).await;
    let tokens = app.sign_in(EMAIL, PASSWORD, "10.1.1.1").await;
    assert_eq!(tokens["token_type"], "Bearer");

    let body = json!({
        "access_token": tokens["access_token"],
        "refresh_token": tokens["refresh_token"],
    });

    let rotated = app.request("/auth/refresh", body.clone(), "10.1.1.1").await;
    assert_eq!(rotated.status, StatusCode::OK);
    assert_ne!(rotated.body["data"]["refresh_token"], tokens["refresh_token"]);

    let replay = app.request("/auth/refresh", body, "10.1.1.1").await;
    assert_eq!(replay.status, StatusCode::CONFLICT);
    assert_eq!(replay.body["message"], "refresh token already used");

    assert_eq!(app.sessions.snapshot().await.len(), 2);
    assert!(app.notifier.sent().await.is_empty());
}

#[tokio::test]
async fn test_refresh_from_new_ip_sends_alert() {
    let app = TestApp::new();
    app.sign_up(EMAIL, PASSWORD).await;
    let tokens = app.sign_in(EMAIL, PASSWORD, "10.1.1.1").await;

    let rotated = app
        .request(
            "/auth/refresh",
            json!({
                "access_token": tokens["access_token"],
                "refresh_token": tokens["refresh_token"],
            }),
            "10.2.2.2",
        )
        .await;

    assert_eq!(rotated.status, StatusCode::OK);
    let sent = app.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, EMAIL);
}

#[tokio::test]
async fn test_spoofed_forwarded_for_still_alerts() {
    let app = TestApp::new();
    app.sign_up(EMAIL, PASSWORD).await;
    let tokens = app.sign_in(EMAIL, PASSWORD, "10.1.1.1").await;

    let rotated = app
        .request_forwarded(
            "/auth/refresh",
            json!({
                "access_token": tokens["access_token"],
                "refresh_token": tokens["refresh_token"],
            }),
            "66.6.6.6",
            Some("10.1.1.1"),
        )
        .await;

    assert_eq!(rotated.status, StatusCode::OK);
    let sent = app.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("66.6.6.6"));
}

#[tokio::test]
async fn test_trusted_proxy_forwards_client_address() {
    let app = TestApp::with_trusted_proxies(&["10.9.9.9"]);
    app.sign_up(EMAIL, PASSWORD).await;

    let signed_in = app
        .request_forwarded(
            "/auth/sign-in",
            json!({ "email": EMAIL, "password": PASSWORD }),
            "10.9.9.9",
            Some("10.1.1.1"),
        )
        .await;
    assert_eq!(signed_in.status, StatusCode::OK);
    let tokens = &signed_in.body["data"];

    let same_client = app
        .request_forwarded(
            "/auth/refresh",
            json!({
                "access_token": tokens["access_token"],
                "refresh_token": tokens["refresh_token"],
            }),
            "10.9.9.9",
            Some("10.1.1.1"),
        )
        .await;
    assert_eq!(same_client.status, StatusCode::OK);
    assert!(app.notifier.sent().await.is_empty());

    let tokens = &same_client.body["data"];
    let moved_client = app
        .request_forwarded(
            "/auth/refresh",
            json!({
                "access_token": tokens["access_token"],
                "refresh_token": tokens["refresh_token"],
            }),
            "10.9.9.9",
            Some("10.2.2.2"),
        )
        .await;
    assert_eq!(moved_client.status, StatusCode::OK);
    assert_eq!(app.notifier.sent().await.len(), 1);
}

#[tokio::test]
async fn test_refresh_with_garbage_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .request(
            "/auth/refresh",
            json!({ "access_token": "garbage", "refresh_token": "garbage" }),
            "10.1.1.1",
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "invalid refresh token");
}

#[tokio::test]
async fn test_sign_out_blocks_refresh() {
    let app = TestApp::new();
    app.sign_up(EMAIL, PASSWORD).await;
    let tokens = app.sign_in(EMAIL, PASSWORD, "10.1.1.1").await;

    let signed_out = app
        .request(
            "/auth/sign-out",
            json!({ "access_token": tokens["access_token"] }),
            "10.1.1.1",
        )
        .await;
    assert_eq!(signed_out.status, StatusCode::NO_CONTENT);

    let refresh = app
        .request(
            "/auth/refresh",
            json!({
                "access_token": tokens["access_token"],
                "refresh_token": tokens["refresh_token"],
            }),
            "10.1.1.1",
        )
        .await;
    assert_eq!(refresh.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_client_ip_is_required() {
    let app = TestApp::new();
    app.sign_up(EMAIL, PASSWORD).await;

    let req = Request::builder()
        .method("POST")
        .uri("/auth/sign-in")
        .header("Content-Type", "application/json")
        .header("X-Forwarded-For", "10.1.1.1")
        .body(Body::from(json!({ "email": EMAIL, "password": PASSWORD }).to_string()))
        .expect("Failed to build request");

    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_without_database() {
    let app = TestApp::new();

    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("Failed to build request");

    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert!(response.body["data"].get("database").is_none());
}
