//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with scripted move providers and a local word list, enabling full turn
//! evaluation through the HTTP API without any LLM backend.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tilerace_core::{
    config::ServerConfig, testing::MockProvider, Config, MoveProvider, ProviderConfig,
    ProviderKind,
};

/// Re-export fixtures for test convenience
pub use tilerace_core::testing::fixtures;

/// Test fixture for E2E testing with mock providers.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_turn() {
///     let fixture = TestFixture::with_providers(
///         &["CAT"],
///         vec![MockProvider::new("p").with_response(fixtures::move_json(&[(7, 7, "C")]))],
///     );
///
///     let response = fixture.post("/api/v1/turns/evaluate", snapshot_json("CAT")).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The scripted providers, in registration order
    pub providers: Vec<Arc<MockProvider>>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Fixture without providers.
    pub fn new() -> Self {
        Self::with_providers(&[], Vec::new())
    }

    /// Fixture racing `providers` over an English board whose dictionary
    /// holds `words`.
    pub fn with_providers(words: &[&str], providers: Vec<MockProvider>) -> Self {
        let providers: Vec<Arc<MockProvider>> = providers.into_iter().map(Arc::new).collect();
        let registered: Vec<Arc<dyn MoveProvider>> = providers
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn MoveProvider>)
            .collect();

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            providers: providers
                .iter()
                .map(|p| {
                    ProviderConfig::new(p.name(), ProviderKind::Ollama, "llama3")
                        .with_api_key("secret-key")
                })
                .collect(),
            ..Default::default()
        };

        let pipeline = fixtures::pipeline(words, registered);
        let state = Arc::new(tilerace_server::state::AppState::new(
            config,
            Arc::new(pipeline),
        ));

        Self {
            router: tilerace_server::api::create_router(state),
            providers,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch a plain-text endpoint.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// JSON body of an empty-board snapshot holding `rack`.
pub fn snapshot_json(rack: &str) -> Value {
    serde_json::to_value(fixtures::empty_snapshot(rack)).unwrap()
}
