//! Proxy configuration resolved once at cold start.

use std::fmt;

use portfolio_lambda_shared::{ConfigError, CorsPolicy, EnvLookup, DEFAULT_ALLOWED_ORIGIN};

/// Full upstream URL, e.g. `abc123.execute-api.eu-west-1.amazonaws.com/default/contact`.
pub const ENDPOINT_URL_ENV: &str = "SECURE_ENDPOINT_URL";
/// Secret sent to the upstream in [`crate::API_KEY_HEADER`].
pub const API_KEY_ENV: &str = "SECURE_API_KEY";
/// Optional override for the upstream path.
pub const ENDPOINT_PATH_ENV: &str = "SECURE_ENDPOINT_PATH";
/// Optional override for the allowed CORS origin.
pub const ALLOW_ORIGIN_ENV: &str = "CORS_ALLOW_ORIGIN";

/// Path requested on the upstream host when none is configured.
pub const DEFAULT_TARGET_PATH: &str = "/default/";

/// Methods advertised in `Access-Control-Allow-Methods`.
pub const ALLOWED_METHODS: &str = "OPTIONS,POST";

/// Where proxied requests are sent and the credential attached to them.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    scheme: &'static str,
    host: String,
    path: String,
    api_key: String,
}

impl ProxyTarget {
    /// Resolve a target from the configured endpoint URL.
    ///
    /// The host is everything before the first `/`. A leading `https://` or
    /// `http://` is accepted and selects the scheme; without one, `https` is used.
    pub fn from_endpoint_url(
        endpoint_url: &str,
        path: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let trimmed = endpoint_url.trim();
        let (scheme, rest) = if let Some(rest) = trimmed.strip_prefix("https://") {
            ("https", rest)
        } else if let Some(rest) = trimmed.strip_prefix("http://") {
            ("http", rest)
        } else {
            ("https", trimmed)
        };

        let host = rest.split('/').next().unwrap_or_default();
        if host.is_empty() {
            return Err(ConfigError::invalid(
                ENDPOINT_URL_ENV,
                format!("'{}' has no host", endpoint_url),
            ));
        }

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        Ok(Self {
            scheme,
            host: host.to_string(),
            path,
            api_key: api_key.into(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// URL the outbound POST is sent to.
    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }
}

impl fmt::Debug for ProxyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyTarget")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("path", &self.path)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Process-wide proxy configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub target: ProxyTarget,
    pub cors: CorsPolicy,
}

impl ProxyConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&EnvLookup::process())
    }

    /// Read configuration from `env`.
    pub fn from_lookup(env: &EnvLookup<'_>) -> Result<Self, ConfigError> {
        let endpoint_url = env.required(ENDPOINT_URL_ENV)?;
        let api_key = env.required(API_KEY_ENV)?;
        let path = env
            .optional(ENDPOINT_PATH_ENV)
            .unwrap_or_else(|| DEFAULT_TARGET_PATH.to_string());
        let origin = env
            .optional(ALLOW_ORIGIN_ENV)
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());

        Ok(Self {
            target: ProxyTarget::from_endpoint_url(&endpoint_url, &path, api_key)?,
            cors: CorsPolicy::new(origin, ALLOWED_METHODS),
        })
    }
}
