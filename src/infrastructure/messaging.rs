//! HTTP messaging providers: Twilio for WhatsApp notifications and an
//! MSG91-style gateway for the text relay endpoints.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Response};

use crate::config::{TextGatewayConfig, TwilioConfig};
use crate::domain::errors::DeliveryError;
use crate::domain::notification::TextChannel;
use crate::domain::ports::{MessagingClient, TextGateway};

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Shared outbound client with a request timeout.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

fn transport(e: reqwest::Error) -> DeliveryError {
    DeliveryError::Transport(e.to_string())
}

/// Turns a non-2xx provider reply into `Rejected`, keeping the body.
async fn ensure_success(response: Response) -> Result<String, DeliveryError> {
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    if !status.is_success() {
        return Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

pub struct TwilioWhatsApp {
    client: Client,
    config: TwilioConfig,
    base_url: String,
}

impl TwilioWhatsApp {
    pub fn new(client: Client, config: TwilioConfig) -> Self {
        Self::with_base_url(client, config, TWILIO_API_BASE)
    }

    pub fn with_base_url(client: Client, config: TwilioConfig, base_url: &str) -> Self {
        Self {
            client,
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.config.account_sid
        )
    }
}

#[async_trait]
impl MessagingClient for TwilioWhatsApp {
    async fn send_whatsapp(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        if to.trim_start_matches("whatsapp:").is_empty() {
            return Err(DeliveryError::InvalidRecipient(to.to_string()));
        }

        let form = [
            ("From", self.config.whatsapp_from.as_str()),
            ("To", to),
            ("Body", body),
        ];
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(transport)?;

        let reply = ensure_success(response).await?;
        debug!("Twilio accepted message to {}: {}", to, reply);
        Ok(())
    }
}

/// Used when Twilio credentials are absent. Every send fails permanently so
/// the queue drops the job without retrying.
#[derive(Debug, Default, Clone)]
pub struct DisabledMessenger;

#[async_trait]
impl MessagingClient for DisabledMessenger {
    async fn send_whatsapp(&self, _to: &str, _body: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::NotConfigured("whatsapp"))
    }
}

pub struct Msg91Gateway {
    client: Client,
    config: TextGatewayConfig,
}

impl Msg91Gateway {
    pub fn new(client: Client, config: TextGatewayConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl TextGateway for Msg91Gateway {
    async fn send_text(
        &self,
        channel: TextChannel,
        to: &str,
        message: &str,
    ) -> Result<String, DeliveryError> {
        let query = [
            ("type", "text"),
            ("apikey", self.config.auth_key.as_str()),
            ("to", to),
            ("sender", self.config.sender_id.as_str()),
            ("message", message),
        ];
        let response = self
            .client
            .get(&self.config.url)
            .query(&query)
            .send()
            .await
            .map_err(transport)?;

        let reply = ensure_success(response).await?;
        info!("Gateway accepted {} message to {}", channel.as_str(), to);
        Ok(reply)
    }
}
