//! AWS Lambda function relaying contact-form submissions as email.
//!
//! Each invocation handles one submission through a linear pipeline:
//!
//! ```text
//! preflight? ──► 200
//!   │
//! parse JSON ──► 400 "Invalid JSON request format."
//!   │
//! validate ────► 400 "Missing required form fields." / "Invalid email address."
//!   │
//! compose + send ─► 200 "Message sent successfully!"
//!                └► 500 "Failed to send message." + error text
//! ```
//!
//! Every response carries the CORS policy, including failures.

mod config;
mod email;
mod mailer;
mod submission;

use std::sync::Arc;

use http::StatusCode;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};

use portfolio_lambda_shared::{
    error_chain, init_tracing, GatewayRequest, GatewayResponse, MessageBody,
};

pub use config::{
    ContactConfig, SmtpSettings, ALLOWED_METHODS, ALLOW_ORIGIN_ENV, DEFAULT_SMTP_PORT,
    IMPLICIT_TLS_PORT, RECEIVING_EMAIL_ENV, SENDER_EMAIL_ENV, SMTP_HOST_ENV, SMTP_PASS_ENV,
    SMTP_PORT_ENV, SMTP_USER_ENV,
};
pub use email::{escape_html, ComposedEmail, DISPLAY_NAME_SUFFIX, SUBJECT_PREFIX};
pub use mailer::{MailError, MailTransport, SmtpMailer};
pub use submission::{
    ContactSubmission, SubmissionError, INVALID_EMAIL_MESSAGE, INVALID_JSON_MESSAGE,
    MISSING_FIELDS_MESSAGE, REQUIRED_FIELDS,
};

/// Client-facing message after a successful dispatch.
pub const SENT_MESSAGE: &str = "Message sent successfully!";
/// Client-facing message when the mail transport fails.
pub const SEND_FAILED_MESSAGE: &str = "Failed to send message.";

/// State shared by every invocation in this execution environment.
pub struct ContactState {
    pub config: ContactConfig,
    pub mailer: Arc<dyn MailTransport>,
}

impl ContactState {
    pub fn new(config: ContactConfig, mailer: impl MailTransport + 'static) -> Self {
        Self {
            config,
            mailer: Arc::new(mailer),
        }
    }
}

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    init_tracing();

    let config = match ContactConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "contact relay configuration invalid");
            return Err(e.into());
        }
    };

    info!(
        smtp_host = %config.smtp.host,
        smtp_port = config.smtp.port,
        implicit_tls = config.smtp.implicit_tls(),
        allow_origin = %config.cors.allow_origin(),
        "contact relay configuration loaded"
    );

    let mailer = SmtpMailer::new(&config.smtp)?;
    let state = Arc::new(ContactState::new(config, mailer));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let state = Arc::clone(&state);
        async move { handler(event, &state).await }
    }))
    .await
}

/// Lambda handler invoked per request.
///
/// Always resolves to `Ok`; failures become 4xx/5xx responses with CORS headers.
pub async fn handler(
    event: LambdaEvent<Value>,
    state: &ContactState,
) -> Result<GatewayResponse, Error> {
    let request_id = event.context.request_id.clone();
    let request = GatewayRequest::from_payload(&event.payload);

    Ok(handle_contact_request(&request, state, &request_id).await)
}

/// Core handler logic separated for reuse in tests.
pub async fn handle_contact_request(
    request: &GatewayRequest,
    state: &ContactState,
    request_id: &str,
) -> GatewayResponse {
    let cors = &state.config.cors;

    if request.is_preflight() {
        info!(request_id = %request_id, "answering CORS preflight");
        return GatewayResponse::preflight(cors);
    }

    let submission = match ContactSubmission::from_body(request.body.as_deref()) {
        Ok(submission) => submission,
        Err(e) => return rejected(state, request_id, &e),
    };

    let reply_to = match submission.reply_address() {
        Ok(address) => address,
        Err(e) => return rejected(state, request_id, &e),
    };

    let email = ComposedEmail::compose(
        &submission,
        reply_to,
        &state.config.sender,
        &state.config.recipient,
    );

    match state.mailer.send(&email).await {
        Ok(()) => {
            info!(
                request_id = %request_id,
                reply_to = %submission.email,
                "email sent successfully"
            );
            GatewayResponse::message(StatusCode::OK, cors, &MessageBody::new(SENT_MESSAGE))
        }
        Err(e) => send_failed(state, request_id, &e),
    }
}

fn rejected(state: &ContactState, request_id: &str, err: &SubmissionError) -> GatewayResponse {
    match err {
        SubmissionError::InvalidJson { reason } => {
            warn!(request_id = %request_id, reason = %reason, "rejecting malformed JSON body");
        }
        SubmissionError::MissingFields { missing } => {
            warn!(request_id = %request_id, missing = ?missing, "rejecting incomplete submission");
        }
        SubmissionError::InvalidEmail { reason } => {
            warn!(request_id = %request_id, reason = %reason, "rejecting invalid reply address");
        }
    }

    GatewayResponse::message(
        StatusCode::BAD_REQUEST,
        &state.config.cors,
        &MessageBody::new(err.to_string()),
    )
}

fn send_failed(state: &ContactState, request_id: &str, err: &MailError) -> GatewayResponse {
    let detail = error_chain(err);
    error!(request_id = %request_id, error = %detail, "error sending email");

    GatewayResponse::message(
        StatusCode::INTERNAL_SERVER_ERROR,
        &state.config.cors,
        &MessageBody::new(SEND_FAILED_MESSAGE).with_error(detail),
    )
}
