//! In-process application harness
//!
//! Builds the router on the in-memory repository and sends requests with
//! `tower::ServiceExt::oneshot`, so no socket is bound.

use askveda::backend::routes::create_router;
use askveda::backend::server::{build_state, AppState};
use askveda::shared::{AppConfig, FallbackPacing};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

/// Secret used to sign test tokens
pub const TEST_SECRET: &str = "askveda-test-secret";

/// Unreachable address, so AI requests take the fallback path
pub const UNREACHABLE_AI: &str = "http://127.0.0.1:9";

/// Response status, headers and raw body
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "Response body is not JSON ({}): {}",
                e,
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Router and state of one test application
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// Application with the fallback AI responder
    pub async fn new() -> Self {
        Self::with_ai_service(UNREACHABLE_AI).await
    }

    /// Application whose AI proxy points at `url`
    pub async fn with_ai_service(url: &str) -> Self {
        let config = AppConfig::builder()
            .environment("test")
            .jwt_secret(TEST_SECRET)
            .bcrypt_cost(4)
            .ai_service_url(url)
            .fallback_pacing(FallbackPacing::Instant)
            .build()
            .expect("Failed to build test config");

        let state = build_state(config)
            .await
            .expect("Failed to build test state");
        let router = create_router(state.clone());
        Self { state, router }
    }

    /// Send a request, with an optional bearer token and JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: serde_json::Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: serde_json::Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }
}
