//! Composition of the relayed email.
//!
//! The From address is always the configured sender. The submitter's address
//! only ever appears in Reply-To and in the body, so a form submission cannot
//! spoof the sending identity.

use lettre::message::{Mailbox, MultiPart};
use lettre::{Address, Message};

use crate::{ContactSubmission, MailError};

/// Prefix prepended to the submitted subject.
pub const SUBJECT_PREFIX: &str = "[Portfolio Contact] ";
/// Suffix appended to the submitter's name in the From display name.
pub const DISPLAY_NAME_SUFFIX: &str = " (Portfolio)";

/// A fully addressed message, independent of the transport that sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub reply_to: Mailbox,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl ComposedEmail {
    /// Compose the notification for `submission`, replying to `reply_to`.
    pub fn compose(
        submission: &ContactSubmission,
        reply_to: Address,
        sender: &Address,
        recipient: &Mailbox,
    ) -> Self {
        let name = single_line(&submission.name);

        Self {
            from: Mailbox::new(
                Some(format!("{}{}", name, DISPLAY_NAME_SUFFIX)),
                sender.clone(),
            ),
            to: recipient.clone(),
            reply_to: Mailbox::new(None, reply_to),
            subject: format!("{}{}", SUBJECT_PREFIX, single_line(&submission.subject)),
            text_body: format!(
                "You have a new message from {} ({}):\n\n{}",
                submission.name, submission.email, submission.message
            ),
            html_body: render_html(submission),
        }
    }

    /// Build the MIME message: a `multipart/alternative` with text and HTML parts.
    pub fn to_message(&self) -> Result<Message, MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .reply_to(self.reply_to.clone())
            .to(self.to.clone())
            .subject(self.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                self.text_body.clone(),
                self.html_body.clone(),
            ))?;
        Ok(message)
    }
}

fn render_html(submission: &ContactSubmission) -> String {
    let message = escape_html(&submission.message)
        .replace("\r\n", "<br>")
        .replace('\n', "<br>");

    format!(
        "<h3>New Portfolio Message</h3>\n\
         <p><strong>From:</strong> {name}</p>\n\
         <p><strong>Email:</strong> {email}</p>\n\
         <p><strong>Subject:</strong> {subject}</p>\n\
         <p><strong>Message:</strong></p>\n\
         <p>{message}</p>\n",
        name = escape_html(&submission.name),
        email = escape_html(&submission.email),
        subject = escape_html(&submission.subject),
        message = message,
    )
}

/// Escape the characters HTML treats as markup.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// Header values must not carry line breaks.
fn single_line(input: &str) -> String {
    input
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
