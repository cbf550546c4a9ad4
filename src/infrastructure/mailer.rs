//! SMTP delivery via lettre, plus a logging stand-in for when no relay is
//! configured.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::info;

use crate::config::SmtpConfig;
use crate::domain::errors::DeliveryError;
use crate::domain::notification::OutboundEmail;
use crate::domain::ports::Mailer;

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds a STARTTLS relay transport. No connection is opened until the
    /// first send.
    pub fn new(config: &SmtpConfig, sender_name: &str) -> Result<Self, DeliveryError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(credentials)
            .build();

        let address = config
            .from_address
            .parse()
            .map_err(|_| DeliveryError::NotConfigured("DEFAULT_FROM_EMAIL"))?;

        Ok(Self {
            transport,
            from: Mailbox::new(Some(sender_name.to_string()), address),
        })
    }

    fn build_message(&self, email: &OutboundEmail) -> Result<Message, DeliveryError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| DeliveryError::InvalidRecipient(email.to.clone()))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.as_str());

        let text = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(email.text.clone());

        let message = match &email.html {
            Some(html) => builder.multipart(
                MultiPart::alternative().singlepart(text).singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.clone()),
                ),
            ),
            None => builder.singlepart(text),
        };

        message.map_err(|e| DeliveryError::Permanent(format!("failed to build message: {e}")))
    }
}

fn classify(e: SmtpError) -> DeliveryError {
    if e.is_permanent() {
        DeliveryError::Permanent(e.to_string())
    } else {
        DeliveryError::Transport(e.to_string())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError> {
        let message = self.build_message(email)?;
        self.transport.send(message).await.map_err(classify)?;
        Ok(())
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError> {
        info!(
            "SMTP not configured; email to {} with subject '{}':\n{}",
            email.to, email.subject, email.text
        );
        Ok(())
    }
}
