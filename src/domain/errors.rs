use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Forbidden")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Upstream failure: {0}")]
    Upstream(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

/// Failure to hand a message to an outbound provider.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("channel not configured: {0}")]
    NotConfigured(&'static str),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("provider rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("permanent failure: {0}")]
    Permanent(String),
}

impl DeliveryError {
    /// Transport errors, throttling and provider-side 5xx are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            DeliveryError::Transport(_) => true,
            DeliveryError::Rejected { status, .. } => *status == 429 || *status >= 500,
            DeliveryError::InvalidRecipient(_)
            | DeliveryError::NotConfigured(_)
            | DeliveryError::Permanent(_) => false,
        }
    }
}

impl From<DeliveryError> for DomainError {
    fn from(e: DeliveryError) -> Self {
        DomainError::Upstream(e.to_string())
    }
}
