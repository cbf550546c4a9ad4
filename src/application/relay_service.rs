//! Pass-through endpoints that let the storefront send arbitrary texts and
//! emails through the backend's provider accounts.

use std::sync::Arc;

use log::{error, info};

use super::notifier::Notifier;
use crate::domain::contact::{require, validate_email};
use crate::domain::errors::DomainError;
use crate::domain::notification::{OutboundEmail, TextChannel};
use crate::domain::ports::TextGateway;

pub struct RelayService {
    gateway: Arc<dyn TextGateway>,
    notifier: Notifier,
}

impl RelayService {
    pub fn new(gateway: Arc<dyn TextGateway>, notifier: Notifier) -> Self {
        Self { gateway, notifier }
    }

    /// Sends a text right away and returns the gateway's reply body.
    pub async fn send_text(
        &self,
        channel: TextChannel,
        to: Option<&str>,
        message: Option<&str>,
    ) -> Result<String, DomainError> {
        let to = require("to", to)?;
        let message = require("message", message)?;

        match self.gateway.send_text(channel, to, message).await {
            Ok(reply) => {
                info!("Relayed {} message to {}", channel.as_str(), to);
                Ok(reply)
            }
            Err(e) => {
                error!("Relaying {} message to {} failed: {}", channel.as_str(), to, e);
                Err(e.into())
            }
        }
    }

    /// Validates and queues an HTML email. Delivery happens in the background.
    pub fn queue_email(
        &self,
        to: Option<&str>,
        subject: Option<&str>,
        html: Option<&str>,
    ) -> Result<(), DomainError> {
        let to = require("to", to)?;
        validate_email("to", to)?;
        let subject = require("subject", subject)?;
        let html = require("html", html)?;

        self.notifier.send_email(OutboundEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            text: "This message is best viewed in an HTML-capable email client.".to_string(),
            html: Some(html.to_string()),
        });
        Ok(())
    }
}
