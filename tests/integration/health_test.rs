//! Health endpoints.

use axum::http::{Method, StatusCode};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_detailed_reports_cache() {
    let app = TestApp::new();
    let token = app.login("alice", "alice-pass", "user").await;
    app.request(Method::GET, "/api/auth/me", Some(&token), None)
        .await;

    let (status, body) = app
        .request(Method::GET, "/api/health/detailed", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["store"], "memory");
    assert_eq!(body["data"]["database"], "not_configured");
    assert_eq!(body["data"]["cache"]["capacity"], 10000);
    assert_eq!(body["data"]["cache"]["hits"], 1);
}
