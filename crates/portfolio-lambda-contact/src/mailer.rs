//! Mail transport used to dispatch composed messages.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use thiserror::Error;
use tracing::debug;

use crate::{ComposedEmail, SmtpSettings};

/// Failure to build or deliver a message.
#[derive(Debug, Error)]
pub enum MailError {
    /// The MIME message could not be assembled.
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// The SMTP exchange failed (connect, TLS, auth, rejection, ...).
    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Delivery failure reported by any other [`MailTransport`].
    #[error("{0}")]
    Transport(String),
}

/// Something that can deliver a composed email.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &ComposedEmail) -> Result<(), MailError>;
}

/// [`MailTransport`] submitting through an authenticated SMTP relay.
///
/// The underlying transport keeps a connection pool, so one instance is built
/// per process and reused across invocations.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    implicit_tls: bool,
}

impl SmtpMailer {
    /// Build the transport. No connection is opened until the first send.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let implicit_tls = settings.implicit_tls();
        let builder = if implicit_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        };

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            implicit_tls,
        })
    }

    /// Whether the connection is wrapped in TLS from the first byte (port 465)
    /// rather than upgraded with STARTTLS.
    pub fn implicit_tls(&self) -> bool {
        self.implicit_tls
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &ComposedEmail) -> Result<(), MailError> {
        let message = email.to_message()?;
        let response = self.transport.send(message).await?;
        debug!(code = %response.code(), "SMTP server accepted message");
        Ok(())
    }
}
