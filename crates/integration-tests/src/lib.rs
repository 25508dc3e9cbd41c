//! Integration tests for repX.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p repx-integration-tests
//! ```
//!
//! No server or external service is needed: API tests drive the storefront
//! router in-process through `tower::ServiceExt::oneshot`.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart, pricing and checkout through `repx-core` end to end
//! - `storefront_api` - HTTP API with sessions, snapshots and checkout

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use repx_core::MemoryStore;
use repx_storefront::catalog::load_catalog;
use repx_storefront::config::StorefrontConfig;
use repx_storefront::state::AppState;
use repx_storefront::storage::SharedStore;
use serde_json::Value;
use tower::ServiceExt;

/// A response as seen by tests.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, or a JSON string for non-JSON bodies.
    pub body: Value,
}

/// One browser talking to an in-process storefront.
///
/// Keeps the session cookie between requests the way a browser would.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Storefront with default configuration and an in-memory snapshot store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(StorefrontConfig::default(), Arc::new(MemoryStore::new()))
    }

    /// Storefront with the given configuration and snapshot store.
    ///
    /// # Panics
    ///
    /// Panics if the built-in catalog is invalid.
    #[must_use]
    pub fn with_store(config: StorefrontConfig, store: SharedStore) -> Self {
        let catalog = load_catalog(None).expect("built-in catalog must load");
        let state = AppState::with_parts(config, catalog, store);
        Self::for_router(repx_storefront::app(state))
    }

    /// A fresh browser (no cookie) against an existing router.
    #[must_use]
    pub const fn for_router(router: Router) -> Self {
        Self {
            router,
            cookie: None,
        }
    }

    /// Another browser sharing this one's server.
    #[must_use]
    pub fn new_browser(&self) -> Self {
        Self::for_router(self.router.clone())
    }

    /// Forget the session cookie.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, &[]).await
    }

    pub async fn post(&mut self, path: &str, body: Option<Value>) -> TestResponse {
        self.send(Method::POST, path, body, &[]).await
    }

    /// Send a request with extra headers.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request must build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
