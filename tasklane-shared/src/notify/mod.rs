/// Templated email dispatch
///
/// A [`Notifier`] renders a named template and then either sends it straight
/// over SMTP or hands it to a queue for a mail worker.
///
/// | Mode | Transport | On failure |
/// |------|-----------|------------|
/// | Direct | [`mail::SmtpMailer`] | logged, reported as [`Dispatch::Dropped`] |
/// | Queued | [`queue::RedisQueue`] | error returned to the caller |
///
/// Rendering errors are returned in both modes.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use serde_json::json;
/// use tasklane_shared::notify::{
///     mail::{SmtpConfig, SmtpMailer},
///     templates::{TemplateRenderer, FORGOTTEN_PASSWORD},
///     Email, Notifier,
/// };
///
/// # async fn example() -> Result<(), tasklane_shared::notify::NotifyError> {
/// let mailer = SmtpMailer::new(&SmtpConfig {
///     host: "localhost".to_string(),
///     port: 1025,
///     username: None,
///     password: None,
///     from: "no-reply@tasklane.dev".to_string(),
/// })?;
/// let notifier = Notifier::direct(TemplateRenderer::new()?, Arc::new(mailer));
///
/// notifier
///     .send_email(Email {
///         template: FORGOTTEN_PASSWORD,
///         subject: "Your new password".to_string(),
///         params: json!({"name": "Ada", "password": "n3wPassw0rd"}),
///         recipients: vec!["ada@example.com".to_string()],
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

pub mod mail;
pub mod queue;
pub mod templates;

use std::sync::Arc;

use serde_json::Value;

use mail::{MailTransport, OutgoingMail};
use queue::{MessageQueue, QueuedEmail};
use templates::TemplateRenderer;

/// Error type for notification dispatch
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An email to render and dispatch
#[derive(Debug, Clone)]
pub struct Email {
    /// Template name, e.g. [`templates::INVITE`]
    pub template: &'static str,
    pub subject: String,

    /// Template variables; must be a JSON object
    pub params: Value,
    pub recipients: Vec<String>,
}

/// What happened to an email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Accepted by the SMTP server
    Sent,

    /// Pushed onto the queue
    Queued,

    /// Direct send failed; the error was logged
    Dropped,
}

impl Dispatch {
    pub fn is_delivered(self) -> bool {
        !matches!(self, Dispatch::Dropped)
    }
}

enum Delivery {
    Direct(Arc<dyn MailTransport>),
    Queued(Arc<dyn MessageQueue>),
}

/// Renders and dispatches emails
pub struct Notifier {
    renderer: TemplateRenderer,
    delivery: Delivery,
}

impl Notifier {
    pub fn direct(renderer: TemplateRenderer, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            renderer,
            delivery: Delivery::Direct(transport),
        }
    }

    pub fn queued(renderer: TemplateRenderer, queue: Arc<dyn MessageQueue>) -> Self {
        Self {
            renderer,
            delivery: Delivery::Queued(queue),
        }
    }

    /// Renders `email.template` and dispatches it
    ///
    /// # Errors
    ///
    /// - `NotifyError::Template` if rendering fails (both modes)
    /// - any queue error in queued mode
    pub async fn send_email(&self, email: Email) -> Result<Dispatch, NotifyError> {
        let html = self.renderer.render(email.template, &email.params)?;

        match &self.delivery {
            Delivery::Direct(transport) => {
                let mail = OutgoingMail {
                    subject: email.subject,
                    html,
                    recipients: email.recipients,
                };

                match transport.send(&mail).await {
                    Ok(()) => Ok(Dispatch::Sent),
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            template = email.template,
                            "Failed to send email"
                        );
                        Ok(Dispatch::Dropped)
                    }
                }
            }
            Delivery::Queued(queue) => {
                let body = serde_json::to_string(&QueuedEmail {
                    html,
                    subject: email.subject,
                    params: email.params,
                    recipients: email.recipients,
                })?;

                queue.push(body).await?;
                tracing::debug!(template = email.template, "Email queued");
                Ok(Dispatch::Queued)
            }
        }
    }
}
