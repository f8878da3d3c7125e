//! Static CORS policy attached to every Lambda response.
//!
//! API Gateway's proxy integration forwards whatever headers the function
//! returns, so both handlers must attach the policy themselves. This includes
//! error responses: a response without `Access-Control-Allow-Origin` is
//! unreadable to the calling browser.

use std::collections::BTreeMap;

/// Origin allowed when `CORS_ALLOW_ORIGIN` is not configured.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://vemmie.github.io";

const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
const CONTENT_TYPE: &str = "Content-Type";

/// CORS headers for a single Lambda function.
///
/// # Example
///
/// ```
/// use portfolio_lambda_shared::CorsPolicy;
///
/// let policy = CorsPolicy::new("https://example.github.io", "OPTIONS,POST");
/// let headers = policy.headers();
/// assert_eq!(headers["Access-Control-Allow-Headers"], "Content-Type");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    allow_origin: String,
    allow_methods: String,
    content_type: Option<String>,
}

impl CorsPolicy {
    /// Create a policy for a single origin and a comma-separated method list.
    pub fn new(allow_origin: impl Into<String>, allow_methods: impl Into<String>) -> Self {
        Self {
            allow_origin: allow_origin.into(),
            allow_methods: allow_methods.into(),
            content_type: None,
        }
    }

    /// Also emit a fixed `Content-Type` header alongside the CORS headers.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The configured origin.
    pub fn allow_origin(&self) -> &str {
        &self.allow_origin
    }

    /// Render the header map for a response.
    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(ALLOW_ORIGIN.to_string(), self.allow_origin.clone());
        headers.insert(ALLOW_HEADERS.to_string(), CONTENT_TYPE.to_string());
        headers.insert(ALLOW_METHODS.to_string(), self.allow_methods.clone());
        if let Some(content_type) = &self.content_type {
            headers.insert(CONTENT_TYPE.to_string(), content_type.clone());
        }
        headers
    }
}
