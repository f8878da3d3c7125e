//! API Gateway proxy-integration event and response shapes.

use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CorsPolicy, MessageBody};

/// HTTP method browsers use for CORS preflight requests.
pub const PREFLIGHT_METHOD: &str = "OPTIONS";

/// The parts of an incoming API Gateway event the handlers consume.
///
/// Both REST API (v1) and HTTP API (v2) payloads are understood: the method is
/// taken from `httpMethod`, falling back to `requestContext.http.method`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayRequest {
    /// HTTP method as delivered by the gateway. Empty if the event carried none.
    pub method: String,
    /// Raw request body, if any.
    pub body: Option<String>,
}

impl GatewayRequest {
    /// Create a request from its parts.
    pub fn new(method: impl Into<String>, body: Option<String>) -> Self {
        Self {
            method: method.into(),
            body,
        }
    }

    /// Extract the request from a raw Lambda payload.
    ///
    /// Decoding is lenient: fields that are missing or carry an unexpected JSON
    /// type are treated as absent, so a handler can always produce a response.
    pub fn from_payload(payload: &Value) -> Self {
        let method = payload
            .get("httpMethod")
            .and_then(Value::as_str)
            .or_else(|| {
                payload
                    .pointer("/requestContext/http/method")
                    .and_then(Value::as_str)
            })
            .unwrap_or_default()
            .to_string();

        let body = payload
            .get("body")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self { method, body }
    }

    /// True for a CORS preflight request.
    pub fn is_preflight(&self) -> bool {
        self.method.eq_ignore_ascii_case(PREFLIGHT_METHOD)
    }

    /// Byte length of the body, zero when absent.
    pub fn body_len(&self) -> usize {
        self.body.as_deref().map_or(0, str::len)
    }
}

/// Response object returned to API Gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl GatewayResponse {
    /// Build a response with the CORS policy's headers.
    pub fn new(status: StatusCode, cors: &CorsPolicy, body: impl Into<String>) -> Self {
        Self::with_status_code(status.as_u16(), cors, body)
    }

    /// Build a response from a raw status code, e.g. one relayed from an upstream.
    pub fn with_status_code(status_code: u16, cors: &CorsPolicy, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: cors.headers(),
            body: body.into(),
        }
    }

    /// 200 with headers only, answering a CORS preflight.
    pub fn preflight(cors: &CorsPolicy) -> Self {
        Self::new(StatusCode::OK, cors, String::new())
    }

    /// Response whose body is a serialized [`MessageBody`].
    pub fn message(status: StatusCode, cors: &CorsPolicy, message: &MessageBody) -> Self {
        Self::new(status, cors, message.to_json())
    }

    /// Header lookup by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cors() -> CorsPolicy {
        CorsPolicy::new("https://a.example", "OPTIONS,POST")
    }

    #[test]
    fn test_from_rest_api_payload() {
        let payload = json!({
            "httpMethod": "POST",
            "body": "{\"a\":1}",
            "headers": { "Content-Type": "application/json" }
        });

        let request = GatewayRequest::from_payload(&payload);
        assert_eq!(request.method, "POST");
        assert_eq!(request.body.as_deref(), Some("{\"a\":1}"));
        assert_eq!(request.body_len(), 7);
    }

    #[test]
    fn test_from_http_api_payload() {
        let payload = json!({
            "version": "2.0",
            "requestContext": { "http": { "method": "OPTIONS" } }
        });

        let request = GatewayRequest::from_payload(&payload);
        assert!(request.is_preflight());
        assert!(request.body.is_none());
        assert_eq!(request.body_len(), 0);
    }

    #[test]
    fn test_from_payload_tolerates_wrong_types() {
        let payload = json!({ "httpMethod": 42, "body": { "not": "a string" } });

        let request = GatewayRequest::from_payload(&payload);
        assert_eq!(request, GatewayRequest::default());
    }

    #[test]
    fn test_preflight_is_case_insensitive() {
        assert!(GatewayRequest::new("options", None).is_preflight());
        assert!(!GatewayRequest::new("POST", None).is_preflight());
        assert!(!GatewayRequest::default().is_preflight());
    }

    #[test]
    fn test_response_serializes_gateway_keys() {
        let response = GatewayResponse::preflight(&cors());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["body"], "");
        assert_eq!(json["headers"]["Access-Control-Allow-Origin"], "https://a.example");
    }

    #[test]
    fn test_message_response() {
        let response = GatewayResponse::message(
            StatusCode::BAD_REQUEST,
            &cors(),
            &MessageBody::new("nope"),
        );

        assert_eq!(response.status_code, 400);
        assert_eq!(response.header("Access-Control-Allow-Methods"), Some("OPTIONS,POST"));
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body, json!({ "message": "nope" }));
    }
}
