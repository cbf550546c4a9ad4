/// An email ready to hand to a [`Mailer`](super::ports::Mailer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// Unit of work for the notification queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationJob {
    Email(OutboundEmail),
    WhatsApp { to: String, body: String },
}

impl NotificationJob {
    pub fn channel(&self) -> &'static str {
        match self {
            NotificationJob::Email(_) => "email",
            NotificationJob::WhatsApp { .. } => "whatsapp",
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            NotificationJob::Email(email) => &email.to,
            NotificationJob::WhatsApp { to, .. } => to,
        }
    }
}

/// Channel selector for the text relay endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextChannel {
    Sms,
    WhatsApp,
}

impl TextChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            TextChannel::Sms => "sms",
            TextChannel::WhatsApp => "whatsapp",
        }
    }
}
