//! Test utilities for Lambda handler testing.
//!
//! This module provides shared test infrastructure for both Lambda crates:
//! API Gateway event builders and mock Lambda event construction.
//!
//! # Usage
//!
//! These utilities are only available in test builds:
//!
//! ```ignore
//! use portfolio_lambda_shared::test_utils::{lambda_event, post_event};
//!
//! #[tokio::test]
//! async fn test_handler() {
//!     let event = lambda_event(post_event(r#"{"a":1}"#));
//!     // ... invoke handler
//! }
//! ```

use lambda_runtime::{Context, LambdaEvent};
use serde_json::{json, Value};

use crate::GatewayResponse;

/// Build a REST API (v1) proxy event with an optional body.
pub fn gateway_event(method: &str, body: Option<&str>) -> Value {
    json!({
        "resource": "/",
        "path": "/",
        "httpMethod": method,
        "headers": { "Content-Type": "application/json" },
        "body": body,
        "isBase64Encoded": false,
    })
}

/// A CORS preflight event.
pub fn preflight_event() -> Value {
    gateway_event("OPTIONS", None)
}

/// A POST event carrying `body`.
pub fn post_event(body: &str) -> Value {
    gateway_event("POST", Some(body))
}

/// Wrap a payload in a `LambdaEvent` with a default context.
///
/// `lambda_runtime::Context` is non-exhaustive, so the default is the only
/// context tests can build.
pub fn lambda_event(payload: Value) -> LambdaEvent<Value> {
    LambdaEvent::new(payload, Context::default())
}

/// Create a mock request ID for testing.
pub fn mock_request_id(suffix: &str) -> String {
    format!("test-request-{}", suffix)
}

/// Parse a response body as JSON.
///
/// # Panics
///
/// Panics if the body is not valid JSON.
pub fn body_json(response: &GatewayResponse) -> Value {
    serde_json::from_str(&response.body).expect("response body should be JSON")
}
