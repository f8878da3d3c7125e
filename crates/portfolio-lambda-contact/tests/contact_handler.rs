use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use portfolio_lambda_contact::{
    handler, ComposedEmail, ContactConfig, ContactState, MailError, MailTransport, SmtpMailer,
    INVALID_EMAIL_MESSAGE, INVALID_JSON_MESSAGE, MISSING_FIELDS_MESSAGE, RECEIVING_EMAIL_ENV,
    REQUIRED_FIELDS, SEND_FAILED_MESSAGE, SENDER_EMAIL_ENV, SENT_MESSAGE, SMTP_HOST_ENV,
    SMTP_PASS_ENV, SMTP_PORT_ENV, SMTP_USER_ENV,
};
use portfolio_lambda_shared::test_utils::{
    body_json, gateway_event, lambda_event, post_event, preflight_event,
};
use portfolio_lambda_shared::{EnvLookup, GatewayResponse};
use serde_json::{json, Value};

/// Captures every message handed to it and answers with a canned outcome.
struct RecordingMailer {
    sent: Mutex<Vec<ComposedEmail>>,
    failure: Option<String>,
}

impl RecordingMailer {
    fn accepting() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            failure: None,
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        })
    }

    fn sent(&self) -> Vec<ComposedEmail> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait::async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, email: &ComposedEmail) -> Result<(), MailError> {
        self.sent.lock().expect("sent lock").push(email.clone());
        match &self.failure {
            Some(message) => Err(MailError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

fn config(smtp_host: &str, smtp_port: &str) -> ContactConfig {
    let env = EnvLookup::from_pairs([
        (SMTP_HOST_ENV, smtp_host),
        (SMTP_PORT_ENV, smtp_port),
        (SMTP_USER_ENV, "user"),
        (SMTP_PASS_ENV, "pass"),
        (SENDER_EMAIL_ENV, "contact@example.com"),
        (RECEIVING_EMAIL_ENV, "me@example.com"),
    ]);
    ContactConfig::from_lookup(&env).expect("valid contact config")
}

fn state(mailer: &Arc<RecordingMailer>) -> ContactState {
    ContactState {
        config: config("smtp.example.com", "587"),
        mailer: Arc::clone(mailer) as Arc<dyn MailTransport>,
    }
}

fn alice() -> Value {
    json!({
        "name": "Alice",
        "email": "alice@example.com",
        "subject": "Hi",
        "message": "Hello\nWorld"
    })
}

async fn invoke(payload: Value, state: &ContactState) -> GatewayResponse {
    tokio::time::timeout(Duration::from_secs(10), handler(lambda_event(payload), state))
        .await
        .expect("handler timed out")
        .expect("handler never returns Err")
}

fn assert_cors(response: &GatewayResponse) {
    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some("https://vemmie.github.io")
    );
    assert_eq!(
        response.header("Access-Control-Allow-Headers"),
        Some("Content-Type")
    );
    assert_eq!(
        response.header("Access-Control-Allow-Methods"),
        Some("POST, OPTIONS")
    );
    assert_eq!(response.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn preflight_sends_nothing() {
    let mailer = RecordingMailer::accepting();
    let response = invoke(preflight_event(), &state(&mailer)).await;

    assert_eq!(response.status_code, 200);
    assert!(response.body.is_empty());
    assert_cors(&response);
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn invalid_json_is_rejected() {
    let mailer = RecordingMailer::accepting();
    let state = state(&mailer);

    for body in ["", "{", "name=Alice&email=a@b.c", "{\"name\": \"Alice\",}"] {
        let response = invoke(post_event(body), &state).await;

        assert_eq!(response.status_code, 400, "body {body:?}");
        assert_eq!(body_json(&response), json!({ "message": INVALID_JSON_MESSAGE }));
        assert_cors(&response);
    }

    let response = invoke(gateway_event("POST", None), &state).await;
    assert_eq!(response.status_code, 400);
    assert_eq!(body_json(&response)["message"], INVALID_JSON_MESSAGE);

    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn missing_or_empty_fields_are_rejected() {
    let mailer = RecordingMailer::accepting();
    let state = state(&mailer);

    for key in REQUIRED_FIELDS {
        for variant in [None, Some(json!(""))] {
            let mut submission = alice();
            match &variant {
                None => {
                    submission.as_object_mut().expect("object").remove(key);
                }
                Some(value) => submission[key] = value.clone(),
            }

            let response = invoke(post_event(&submission.to_string()), &state).await;

            assert_eq!(response.status_code, 400, "field {key} as {variant:?}");
            assert_eq!(
                body_json(&response),
                json!({ "message": MISSING_FIELDS_MESSAGE })
            );
            assert_cors(&response);
        }
    }

    let response = invoke(post_event("null"), &state).await;
    assert_eq!(body_json(&response)["message"], MISSING_FIELDS_MESSAGE);

    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let mailer = RecordingMailer::accepting();
    let mut submission = alice();
    submission["email"] = json!("alice at example dot com");

    let response = invoke(post_event(&submission.to_string()), &state(&mailer)).await;

    assert_eq!(response.status_code, 400);
    assert_eq!(body_json(&response)["message"], INVALID_EMAIL_MESSAGE);
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn valid_submission_is_composed_and_sent() {
    let mailer = RecordingMailer::accepting();
    let response = invoke(post_event(&alice().to_string()), &state(&mailer)).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(body_json(&response), json!({ "message": SENT_MESSAGE }));
    assert_cors(&response);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let email = &sent[0];

    let display_name = email.from.name.as_deref().expect("display name");
    assert!(display_name.contains("Alice"));
    assert_eq!(display_name, "Alice (Portfolio)");
    assert_eq!(email.from.email.to_string(), "contact@example.com");
    assert_eq!(email.to.email.to_string(), "me@example.com");
    assert_eq!(email.reply_to.email.to_string(), "alice@example.com");
    assert_eq!(email.subject, "[Portfolio Contact] Hi");
    assert!(email.html_body.contains("Hello<br>World"));
    assert!(email.text_body.ends_with("Hello\nWorld"));
}

#[tokio::test]
async fn spoofed_sender_never_reaches_from() {
    let mailer = RecordingMailer::accepting();
    let body = json!({
        "name": "CEO",
        "email": "ceo@bank.example",
        "subject": "Wire transfer",
        "message": "Urgent"
    });

    invoke(post_event(&body.to_string()), &state(&mailer)).await;

    let email = &mailer.sent()[0];
    assert_eq!(email.from.email.to_string(), "contact@example.com");
    assert_eq!(email.reply_to.email.to_string(), "ceo@bank.example");
}

#[tokio::test]
async fn transport_failure_returns_500_with_error_text() {
    let mailer = RecordingMailer::failing("535 5.7.8 Authentication credentials invalid");
    let response = invoke(post_event(&alice().to_string()), &state(&mailer)).await;

    assert_eq!(response.status_code, 500);
    assert_cors(&response);
    assert_eq!(
        body_json(&response),
        json!({
            "message": SEND_FAILED_MESSAGE,
            "error": "535 5.7.8 Authentication credentials invalid"
        })
    );
    assert_eq!(mailer.sent().len(), 1);
}

#[tokio::test]
async fn smtp_connection_refused_returns_500() {
    // Bind then drop to obtain a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let config = config("127.0.0.1", &port.to_string());
    let mailer = SmtpMailer::new(&config.smtp).expect("build SMTP transport");
    let state = ContactState::new(config, mailer);

    let response = invoke(post_event(&alice().to_string()), &state).await;

    assert_eq!(response.status_code, 500);
    assert_cors(&response);
    let body = body_json(&response);
    assert_eq!(body["message"], SEND_FAILED_MESSAGE);
    let error = body["error"].as_str().expect("error is a string");
    assert!(!error.is_empty());
}
