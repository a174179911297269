/// Direct SMTP delivery
///
/// Uses an unencrypted relay connection (`builder_dangerous`), which is what
/// the direct mode targets: a local MTA or a development mail catcher.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::NotifyError;

/// A rendered email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub html: String,
    pub recipients: Vec<String>,
}

/// Something that can deliver an [`OutgoingMail`]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifyError>;
}

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,

    /// Sender address, e.g. "Tasklane <no-reply@tasklane.dev>"
    pub from: String,
}

/// lettre-backed SMTP transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds the transport; no connection is made until the first send
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Address` if the sender address is invalid
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&config.from)?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host).port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, NotifyError> {
        if mail.recipients.is_empty() {
            return Err(NotifyError::Address("no recipients".to_string()));
        }

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_HTML);

        for recipient in &mail.recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .body(mail.html.clone())
            .map_err(|e| NotifyError::Address(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifyError> {
        let message = self.build_message(mail)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        tracing::debug!(recipients = mail.recipients.len(), subject = %mail.subject, "Email sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::Address(format!("{}: {}", address, e)))
}
