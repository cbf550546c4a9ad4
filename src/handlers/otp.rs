use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendOtpRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    /// The 6-digit code from the email.
    pub otp: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/otp/send
///
/// Replaces any earlier code for this address. Answers only after the email
/// went out, so a delivery failure is reported to the caller.
#[utoipa::path(
    post,
    path = "/api/otp/send",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "OTP sent", body = MessageResponse),
        (status = 400, description = "Email is required"),
        (status = 502, description = "Failed to send OTP"),
    ),
    tag = "otp"
)]
pub async fn send_otp(
    state: web::Data<AppState>,
    body: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, AppError> {
    state.otp.send_code(body.email.as_deref()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "OTP sent successfully".to_string(),
    }))
}

/// POST /api/otp/verify
#[utoipa::path(
    post,
    path = "/api/otp/verify",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "OTP verified", body = MessageResponse),
        (status = 400, description = "Missing fields, unknown, expired or wrong code"),
    ),
    tag = "otp"
)]
pub async fn verify_otp(
    state: web::Data<AppState>,
    body: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, AppError> {
    state
        .otp
        .verify(body.email.as_deref(), body.otp.as_deref())?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "OTP verified successfully".to_string(),
    }))
}
