//! Common test utilities for API tests
//!
//! Builds the full router over a fresh `MemoryStore` and drives it in-process
//! with `tower::ServiceExt::oneshot`; no network or database involved.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{ApiConfig, Config, DatabaseSettings, JwtConfig, LogConfig, LogFormat};
use taskboard_shared::auth::password::HashingParams;
use taskboard_shared::models::user::{Role, User};
use taskboard_shared::services::identity::{register, Registration};
use taskboard_shared::store::MemoryStore;
use tower::ServiceExt;

pub const PASSWORD: &str = "secret123";

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            seed_sample_data: false,
        },
        database: DatabaseSettings {
            url: "memory://".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_seconds: 1,
        },
        jwt: JwtConfig {
            secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            ttl_minutes: 30,
        },
        hashing: HashingParams::minimal(),
        log: LogConfig {
            format: LogFormat::Pretty,
        },
    }
}

/// A registered user plus a bearer token for them
pub struct Account {
    pub user: User,
    pub token: String,
}

/// Test context containing the router and its backing state
pub struct TestContext {
    pub state: AppState,
    pub app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let state = AppState::new(Arc::new(MemoryStore::new()), test_config());
        let app = build_router(state.clone());
        Self { state, app }
    }

    /// Registers a user directly through the service layer
    pub async fn account(&self, username: &str, role: Role) -> Account {
        let user = register(
            self.state.store(),
            self.state.hashing(),
            Registration {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: PASSWORD.to_string(),
                role,
            },
        )
        .await
        .expect("register account");
        let token = self.state.tokens.issue(user.id).expect("issue token");
        Account { user, token }
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` when the body is empty)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body ({status}): {}", String::from_utf8_lossy(&bytes))
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}
