use async_trait::async_trait;

use super::errors::{DeliveryError, DomainError};
use super::notification::{OutboundEmail, TextChannel};
use super::order::{NewOrder, Order, OrderPage, OrderStatus};
use super::product::Product;
use super::user::{NewUser, User, UserCredentials};

pub trait OrderRepository: Send + Sync + 'static {
    /// Inserts the order. A taken order number surfaces as `DomainError::Conflict`.
    fn insert(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError>;
    fn update_status(
        &self,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn create(&self, user: NewUser) -> Result<User, DomainError>;
    fn email_taken(&self, email: &str) -> Result<bool, DomainError>;
    fn phone_taken(&self, phone: &str) -> Result<bool, DomainError>;
    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    /// Returns the user's existing token, storing `candidate` if there is none.
    fn token_for(&self, user_id: i64, candidate: &str) -> Result<String, DomainError>;
    fn find_by_token(&self, token: &str) -> Result<Option<User>, DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn list(&self) -> Result<Vec<Product>, DomainError>;
    fn find(&self, id: i32) -> Result<Option<Product>, DomainError>;
}

#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError>;
}

/// Chat-style messages sent on behalf of the store (Twilio WhatsApp).
#[async_trait]
pub trait MessagingClient: Send + Sync + 'static {
    async fn send_whatsapp(&self, to: &str, body: &str) -> Result<(), DeliveryError>;
}

/// Bulk text gateway behind the relay endpoints. Returns the provider's raw reply.
#[async_trait]
pub trait TextGateway: Send + Sync + 'static {
    async fn send_text(
        &self,
        channel: TextChannel,
        to: &str,
        message: &str,
    ) -> Result<String, DeliveryError>;
}
