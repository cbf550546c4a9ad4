use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{auth, health, orders, otp, products, relay};

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::get_order,
        orders::list_orders,
        orders::update_order_status,
        products::list_products,
        products::get_product,
        auth::register,
        auth::login,
        auth::me,
        otp::send_otp,
        otp::verify_otp,
        relay::send_sms,
        relay::send_whatsapp,
        relay::send_order_email,
        health::health,
    ),
    components(schemas(
        orders::CreateOrderRequest,
        orders::CreateOrderResponse,
        orders::OrderResponse,
        orders::ListOrdersResponse,
        orders::UpdateStatusRequest,
        products::ProductResponse,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        auth::ProfileResponse,
        otp::SendOtpRequest,
        otp::VerifyOtpRequest,
        otp::MessageResponse,
        relay::TextRelayRequest,
        relay::TextRelayResponse,
        relay::EmailRelayRequest,
        relay::EmailRelayResponse,
    )),
    modifiers(&TokenAuth),
    tags(
        (name = "orders", description = "Checkout and order tracking"),
        (name = "products", description = "Catalog"),
        (name = "auth", description = "Registration and login"),
        (name = "otp", description = "Email one-time codes"),
        (name = "relay", description = "SMS, WhatsApp and email pass-through"),
    )
)]
pub struct ApiDoc;

struct TokenAuth;

impl Modify for TokenAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
