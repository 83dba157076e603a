//! Shared test helpers for integration tests.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use sessionward_api::{AppState, build_app};
use sessionward_auth::SessionManager;
use sessionward_core::config::{AuthConfig, CorsConfig, HashingConfig};
use sessionward_database::{MemorySessionRepository, MemoryUserRepository};
use sessionward_notify::RecordingNotifier;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Session store, for inspecting persisted state
    pub sessions: MemorySessionRepository,
    /// Alert sink
    pub notifier: RecordingNotifier,
}

impl TestApp {
    /// Create a new test application that trusts no proxy
    pub fn new() -> Self {
        Self::with_trusted_proxies(&[])
    }

    /// Create a test application behind the given reverse proxies
    pub fn with_trusted_proxies(proxies: &[&str]) -> Self {
        let config = AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            hashing: HashingConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            ..AuthConfig::default()
        };

        let users = MemoryUserRepository::new();
        let sessions = MemorySessionRepository::new();
        let notifier = RecordingNotifier::new();

        let session_manager = SessionManager::new(
            config,
            Arc::new(users),
            Arc::new(sessions.clone()),
            Arc::new(notifier.clone()),
        )
        .expect("Failed to build session manager");

        let proxies = proxies.iter().map(|p| parse_ip(p));
        let router = build_app(
            AppState::new(Arc::new(session_manager)).with_trusted_proxies(proxies),
            &CorsConfig::default(),
        );

        Self {
            router,
            sessions,
            notifier,
        }
    }

    /// Register a user through the API
    pub async fn sign_up(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            "/auth/sign-up",
            serde_json::json!({ "email": email, "password": password }),
            "127.0.0.1",
        )
        .await
    }

    /// Sign in from `ip` and return the token payload
    pub async fn sign_in(&self, email: &str, password: &str, ip: &str) -> Value {
        let response = self
            .request(
                "/auth/sign-in",
                serde_json::json!({ "email": email, "password": password }),
                ip,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Sign-in failed: {:?}",
            response.body
        );
        response.body["data"].clone()
    }

    /// POST a JSON body from socket peer `peer`
    pub async fn request(&self, path: &str, body: Value, peer: &str) -> TestResponse {
        self.request_forwarded(path, body, peer, None).await
    }

    /// POST a JSON body from `peer`, optionally carrying `X-Forwarded-For`
    pub async fn request_forwarded(
        &self,
        path: &str,
        body: Value,
        peer: &str,
        forwarded_for: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .extension(ConnectInfo(SocketAddr::new(parse_ip(peer), 40_000)));
        if let Some(chain) = forwarded_for {
            builder = builder.header("X-Forwarded-For", chain);
        }
        let req = builder
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prepared request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

fn parse_ip(ip: &str) -> IpAddr {
    ip.parse().expect("Invalid IP in test")
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
