use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::notification::TextChannel;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TextRelayRequest {
    /// Recipient number as the gateway expects it, e.g. `919876543210`.
    pub to: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TextRelayResponse {
    pub status: String,
    /// Raw gateway reply.
    pub msg91: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailRelayRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmailRelayResponse {
    pub status: String,
    pub message: String,
}

async fn relay_text(
    state: web::Data<AppState>,
    channel: TextChannel,
    body: TextRelayRequest,
) -> Result<HttpResponse, AppError> {
    let reply = state
        .relay
        .send_text(channel, body.to.as_deref(), body.message.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(TextRelayResponse {
        status: "success".to_string(),
        msg91: reply,
    }))
}

/// POST /api/sms/send
#[utoipa::path(
    post,
    path = "/api/sms/send",
    request_body = TextRelayRequest,
    responses(
        (status = 200, description = "Gateway accepted the message", body = TextRelayResponse),
        (status = 400, description = "Missing recipient or message"),
        (status = 502, description = "Gateway failure"),
    ),
    tag = "relay"
)]
pub async fn send_sms(
    state: web::Data<AppState>,
    body: web::Json<TextRelayRequest>,
) -> Result<HttpResponse, AppError> {
    relay_text(state, TextChannel::Sms, body.into_inner()).await
}

/// POST /api/whatsapp/send
#[utoipa::path(
    post,
    path = "/api/whatsapp/send",
    request_body = TextRelayRequest,
    responses(
        (status = 200, description = "Gateway accepted the message", body = TextRelayResponse),
        (status = 400, description = "Missing recipient or message"),
        (status = 502, description = "Gateway failure"),
    ),
    tag = "relay"
)]
pub async fn send_whatsapp(
    state: web::Data<AppState>,
    body: web::Json<TextRelayRequest>,
) -> Result<HttpResponse, AppError> {
    relay_text(state, TextChannel::WhatsApp, body.into_inner()).await
}

/// POST /api/email/order-confirmation
///
/// Queues the email; delivery happens in the background.
#[utoipa::path(
    post,
    path = "/api/email/order-confirmation",
    request_body = EmailRelayRequest,
    responses(
        (status = 202, description = "Email queued", body = EmailRelayResponse),
        (status = 400, description = "Missing or invalid fields"),
    ),
    tag = "relay"
)]
pub async fn send_order_email(
    state: web::Data<AppState>,
    body: web::Json<EmailRelayRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    state.relay.queue_email(
        body.to.as_deref(),
        body.subject.as_deref(),
        body.html.as_deref(),
    )?;

    Ok(HttpResponse::Accepted().json(EmailRelayResponse {
        status: "success".to_string(),
        message: "Email queued".to_string(),
    }))
}
