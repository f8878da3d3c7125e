//! JSON message body shared by both Lambda functions.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Body of every handler-generated response.
///
/// `error` carries the underlying failure text and is omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageBody {
    /// Create a body with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    /// Attach the underlying error text.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> String {
        // Built through `Value` so rendering is infallible.
        match &self.error {
            Some(error) => json!({ "message": self.message, "error": error }),
            None => json!({ "message": self.message }),
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_only() {
        let json = MessageBody::new("Message sent successfully!").to_json();
        assert_eq!(json, r#"{"message":"Message sent successfully!"}"#);
    }

    #[test]
    fn test_message_with_error_round_trips() {
        let body = MessageBody::new("Failed to send message.").with_error("connection reset");
        let parsed: MessageBody = serde_json::from_str(&body.to_json()).unwrap();
        assert_eq!(parsed, body);
    }

    #[test]
    fn test_quotes_are_escaped() {
        let json = MessageBody::new("said \"hi\"").to_json();
        let parsed: MessageBody = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.message, "said \"hi\"");
    }
}
