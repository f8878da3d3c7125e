//! Contact-form submission parsing and validation.

use lettre::Address;
use serde_json::Value;
use thiserror::Error;

/// Client-facing message for a body that is not JSON.
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON request format.";
/// Client-facing message for an absent or empty field.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required form fields.";
/// Client-facing message for a reply address that cannot be used.
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email address.";

/// Fields every submission must carry, in the order they are reported.
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "email", "subject", "message"];

/// Problem with the submitted form. Reported to the caller as a 400.
///
/// The `Display` text is exactly the message returned to the client; the
/// variant payloads are for logs only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Invalid JSON request format.")]
    InvalidJson { reason: String },

    #[error("Missing required form fields.")]
    MissingFields { missing: Vec<&'static str> },

    #[error("Invalid email address.")]
    InvalidEmail { reason: String },
}

/// A contact-form submission with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    /// Parse a request body.
    ///
    /// An absent body counts as malformed JSON. Any JSON value that is not an
    /// object, and any field that is missing, not a string, or empty, counts as
    /// a missing field.
    pub fn from_body(body: Option<&str>) -> Result<Self, SubmissionError> {
        let raw = body.ok_or_else(|| SubmissionError::InvalidJson {
            reason: "request body is absent".to_string(),
        })?;

        let value: Value = serde_json::from_str(raw).map_err(|e| SubmissionError::InvalidJson {
            reason: e.to_string(),
        })?;

        Self::from_value(&value)
    }

    /// Extract the required fields from an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, SubmissionError> {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };

        match (
            field("name"),
            field("email"),
            field("subject"),
            field("message"),
        ) {
            (Some(name), Some(email), Some(subject), Some(message)) => Ok(Self {
                name: name.to_string(),
                email: email.to_string(),
                subject: subject.to_string(),
                message: message.to_string(),
            }),
            _ => Err(SubmissionError::MissingFields {
                missing: REQUIRED_FIELDS
                    .iter()
                    .copied()
                    .filter(|key| field(key).is_none())
                    .collect(),
            }),
        }
    }

    /// Validate and parse the submitter's address, for the Reply-To header.
    ///
    /// This is the last check before composition; the parsed address is
    /// handed straight to [`ComposedEmail::compose`](crate::ComposedEmail::compose).
    pub fn reply_address(&self) -> Result<Address, SubmissionError> {
        self.email
            .trim()
            .parse()
            .map_err(|e: lettre::address::AddressError| SubmissionError::InvalidEmail {
                reason: e.to_string(),
            })
    }
}
