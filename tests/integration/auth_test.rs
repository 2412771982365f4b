//! Login, identity lookup, sliding expiry, and logout over HTTP.

use axum::http::{Method, StatusCode};
use chrono::Duration;
use serde_json::json;

use sessionhub_auth::TokenStore;
use sessionhub_core::config::{SessionConfig, TokenStoreKind};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_login_then_me() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"username": "alice", "password": "alice-pass", "role": "user"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let token = body["data"]["token"].as_str().unwrap();
    assert_eq!(body["data"]["identity"]["username"], "alice");
    assert_eq!(body["data"]["identity"]["token"], token);
    assert!(body["data"]["expires_at"].is_string());

    let (status, body) = app.request(Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["custom_space"], "alice-space");
}

#[tokio::test]
async fn test_bad_credentials_rejected() {
    let app = TestApp::new();

    for payload in [
        json!({"username": "alice", "password": "wrong", "role": "user"}),
        json!({"username": "alice", "password": "alice-pass", "role": "admin"}),
        json!({"username": "nobody", "password": "x", "role": "user"}),
    ] {
        let (status, body) = app
            .request(Method::POST, "/api/auth/login", None, Some(payload))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "AUTHENTICATION_FAILED");
    }

    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_login_validation() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"username": "", "password": "alice-pass", "role": "user"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_or_unknown_token() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");

    let (status, body) = app
        .request(Method::GET, "/api/auth/me", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::new();
    let token = app.login("alice", "alice-pass", "user").await;

    let (status, _) = app
        .request(Method::POST, "/api/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.store.fetch_by_token(&token).await.unwrap().is_none());

    let (status, body) = app.request(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");

    // A second logout with the same token cannot authenticate any more.
    let (status, _) = app
        .request(Method::POST, "/api/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_idle_session_expires() {
    let app = TestApp::new();
    let token = app.login("root", "root-pass", "admin").await;

    app.clock.advance(Duration::seconds(1801));

    let (status, body) = app.request(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_activity_slides_expiry() {
    let app = TestApp::new();
    let token = app.login("alice", "alice-pass", "user").await;
    let issued = app.store.fetch_by_token(&token).await.unwrap().unwrap();

    app.clock.advance(Duration::seconds(1500));
    let (status, _) = app.request(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let renewed = app.store.fetch_by_token(&token).await.unwrap().unwrap();
    assert_eq!(renewed.expires_at, issued.expires_at + Duration::seconds(1500));

    // Past the original expiry, still inside the renewed one.
    app.clock.advance(Duration::seconds(1000));
    let (status, _) = app.request(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reclaimed_token_rejected() {
    let app = TestApp::new();
    let token = app.login("alice", "alice-pass", "user").await;

    app.clock.advance(Duration::seconds(3600));
    let removed = app.sessions.reclaimer().run_once().await.unwrap();
    assert_eq!(removed, 1);

    let (status, body) = app.request(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_evicted_session_still_resolves() {
    let app = TestApp::with_config(SessionConfig {
        store: TokenStoreKind::Memory,
        cache_capacity: 1,
        ..SessionConfig::default()
    });

    let first = app.login("alice", "alice-pass", "user").await;
    let second = app.login("root", "root-pass", "admin").await;

    let (status, body) = app.request(Method::GET, "/api/auth/me", Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");

    let (status, body) = app.request(Method::GET, "/api/auth/me", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "root");

    assert!(app.sessions.cache_stats().evictions >= 2);
}
