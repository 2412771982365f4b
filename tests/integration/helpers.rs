//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use sessionhub_api::{AppState, build_router};
use sessionhub_auth::{FixedIdentityProvider, MemoryTokenStore, SessionService};
use sessionhub_core::config::{SessionConfig, TokenStoreKind};
use sessionhub_core::traits::ManualClock;
use sessionhub_entity::identity::Identity;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Token records behind the service
    pub store: MemoryTokenStore,
    /// Time source driving every expiry decision
    pub clock: ManualClock,
    /// The session service the router uses
    pub sessions: Arc<SessionService>,
}

impl TestApp {
    /// Create a test application with default session settings
    pub fn new() -> Self {
        Self::with_config(SessionConfig {
            store: TokenStoreKind::Memory,
            ..SessionConfig::default()
        })
    }

    /// Create a test application with the given session settings
    pub fn with_config(config: SessionConfig) -> Self {
        let store = MemoryTokenStore::new();
        let clock = ManualClock::default();

        let identities = FixedIdentityProvider::new()
            .with_account(identity("alice", "user"), "alice-pass")
            .with_account(identity("root", "admin"), "root-pass");

        let sessions = Arc::new(SessionService::new(
            Arc::new(store.clone()),
            Arc::new(identities),
            Arc::new(clock.clone()),
            config,
        ));

        let router = build_router(AppState::new(Arc::clone(&sessions), None));

        Self {
            router,
            store,
            clock,
            sessions,
        }
    }

    /// Send a request and return the status and JSON body
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Log in and return the issued token
    pub async fn login(&self, username: &str, password: &str, role: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "password": password,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        body["data"]["token"].as_str().unwrap().to_string()
    }
}

fn identity(username: &str, role: &str) -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        username: username.to_string(),
        display_name: None,
        role: role.to_string(),
        custom_space: Some(format!("{username}-space")),
        token: None,
    }
}
