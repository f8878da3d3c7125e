//! Contact relay configuration resolved once at cold start.

use std::fmt;

use lettre::message::Mailbox;
use lettre::Address;

use portfolio_lambda_shared::{ConfigError, CorsPolicy, EnvLookup, DEFAULT_ALLOWED_ORIGIN};

pub const SMTP_HOST_ENV: &str = "SMTP_HOST";
pub const SMTP_PORT_ENV: &str = "SMTP_PORT";
pub const SMTP_USER_ENV: &str = "SMTP_USER";
pub const SMTP_PASS_ENV: &str = "SMTP_PASS";
/// Address the relay sends from. Must be one the SMTP account may send as.
pub const SENDER_EMAIL_ENV: &str = "SENDER_EMAIL";
/// Inbox that receives submissions.
pub const RECEIVING_EMAIL_ENV: &str = "RECEIVING_EMAIL";
pub const ALLOW_ORIGIN_ENV: &str = "CORS_ALLOW_ORIGIN";

/// SMTP submission port used when `SMTP_PORT` is unset.
pub const DEFAULT_SMTP_PORT: u16 = 587;
/// Port on which the connection is TLS from the first byte (SMTPS).
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Methods advertised in `Access-Control-Allow-Methods`.
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// Connection and credentials for the SMTP provider.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl SmtpSettings {
    /// Implicit TLS on 465, STARTTLS on every other port.
    pub fn implicit_tls(&self) -> bool {
        self.port == IMPLICIT_TLS_PORT
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Process-wide contact relay configuration.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    pub smtp: SmtpSettings,
    pub sender: Address,
    pub recipient: Mailbox,
    pub cors: CorsPolicy,
}

impl ContactConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&EnvLookup::process())
    }

    /// Read configuration from `env`.
    pub fn from_lookup(env: &EnvLookup<'_>) -> Result<Self, ConfigError> {
        let smtp = SmtpSettings {
            host: env.required(SMTP_HOST_ENV)?,
            port: env.parse_or(SMTP_PORT_ENV, DEFAULT_SMTP_PORT)?,
            username: env.required(SMTP_USER_ENV)?,
            password: env.required(SMTP_PASS_ENV)?,
        };

        let sender_raw = env.required(SENDER_EMAIL_ENV)?;
        let sender: Address = sender_raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(SENDER_EMAIL_ENV, format!("'{}': {}", sender_raw, e)))?;

        let recipient_raw = env.required(RECEIVING_EMAIL_ENV)?;
        let recipient: Mailbox = recipient_raw.trim().parse().map_err(|e| {
            ConfigError::invalid(RECEIVING_EMAIL_ENV, format!("'{}': {}", recipient_raw, e))
        })?;

        let origin = env
            .optional(ALLOW_ORIGIN_ENV)
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());

        Ok(Self {
            smtp,
            sender,
            recipient,
            cors: CorsPolicy::new(origin, ALLOWED_METHODS).with_content_type("application/json"),
        })
    }
}
