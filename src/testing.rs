//! In-memory adapters and recording fakes for unit and handler tests.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::application::catalog_service::CatalogService;
use crate::application::notification_queue::NotificationQueue;
use crate::application::notifier::Notifier;
use crate::application::order_service::OrderService;
use crate::application::otp_service::{OtpService, OtpStore};
use crate::application::relay_service::RelayService;
use crate::application::user_service::UserService;
use crate::config::StoreProfile;
use crate::domain::errors::{DeliveryError, DomainError};
use crate::domain::notification::{NotificationJob, OutboundEmail, TextChannel};
use crate::domain::order::{page_offset, NewOrder, Order, OrderPage, OrderStatus};
use crate::domain::ports::{
    Mailer, MessagingClient, OrderRepository, ProductRepository, TextGateway, UserRepository,
};
use crate::domain::product::Product;
use crate::domain::user::{NewUser, Registration, User, UserCredentials};
use crate::state::AppState;

type FailureFactory = Box<dyn Fn() -> DeliveryError + Send + Sync>;

// ── Repositories ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
    rejections_left: Mutex<usize>,
    next_id: AtomicI64,
}

impl InMemoryOrderRepository {
    pub fn len(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    /// Makes the next `n` inserts fail as if the order number were taken.
    pub fn reject_next_inserts(&self, n: usize) {
        *self.rejections_left.lock().unwrap() = n;
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn insert(&self, new: NewOrder) -> Result<Order, DomainError> {
        {
            let mut left = self.rejections_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(DomainError::Conflict("duplicate order number".into()));
            }
        }
        let mut orders = self.orders.lock().unwrap();
        if orders.iter().any(|o| o.order_number == new.order_number) {
            return Err(DomainError::Conflict("duplicate order number".into()));
        }
        let now = Utc::now();
        let draft = new.draft;
        let order = Order {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            order_number: new.order_number,
            transaction_id: draft.transaction_id,
            order_date: new.order_date,
            total_amount: draft.total_amount,
            items_count: draft.items_count,
            payment_method: draft.payment_method,
            is_paid: draft.is_paid,
            customer_email: draft.customer_email,
            customer_name: draft.customer_name,
            customer_phone: draft.customer_phone,
            customer_address: draft.customer_address,
            customer_pincode: draft.customer_pincode,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        orders.push(order.clone());
        Ok(order)
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    fn list(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError> {
        let offset = page_offset(page, limit)?;
        let orders = self.orders.lock().unwrap();
        let items = orders
            .iter()
            .rev()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(OrderPage {
            items,
            total: orders.len() as i64,
        })
    }

    fn update_status(
        &self,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        Ok(orders
            .iter_mut()
            .find(|o| o.order_number == order_number)
            .map(|o| {
                o.status = status;
                o.updated_at = Utc::now();
                o.clone()
            }))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<UserCredentials>>,
    tokens: Mutex<HashMap<i64, String>>,
}

impl InMemoryUserRepository {
    pub fn credentials(&self, email: &str) -> Option<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user.email == email)
            .cloned()
    }

    pub fn promote_to_staff(&self, user_id: i64) {
        if let Some(c) = self
            .users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|c| c.user.id == user_id)
        {
            c.user.is_staff = true;
        }
    }
}

impl UserRepository for InMemoryUserRepository {
    fn create(&self, new: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|c| c.user.email == new.email || c.user.phone == new.phone)
        {
            return Err(DomainError::Conflict("duplicate user".into()));
        }
        let user = User {
            id: users.len() as i64 + 1,
            email: new.email,
            name: new.name,
            phone: new.phone,
            is_staff: false,
            created_at: Utc::now(),
        };
        users.push(UserCredentials {
            user: user.clone(),
            password_hash: new.password_hash,
        });
        Ok(user)
    }

    fn email_taken(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.credentials(email).is_some())
    }

    fn phone_taken(&self, phone: &str) -> Result<bool, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.user.phone == phone))
    }

    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self.credentials(email))
    }

    fn token_for(&self, user_id: i64, candidate: &str) -> Result<String, DomainError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .entry(user_id)
            .or_insert_with(|| candidate.to_string())
            .clone())
    }

    fn find_by_token(&self, token: &str) -> Result<Option<User>, DomainError> {
        let user_id = self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|(_, t)| t.as_str() == token)
            .map(|(id, _)| *id);
        Ok(user_id.and_then(|id| {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.user.id == id)
                .map(|c| c.user.clone())
        }))
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Vec<Product>,
}

impl InMemoryProductRepository {
    pub fn with(products: Vec<Product>) -> Self {
        Self { products }
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn list(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.products.clone())
    }

    fn find(&self, id: i32) -> Result<Option<Product>, DomainError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }
}

// ── Outbound fakes ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    failures_left: Mutex<usize>,
    failure: Option<FailureFactory>,
}

impl RecordingMailer {
    /// Fails the first `n` sends with the error built by `make`.
    pub fn failing_first<F>(n: usize, make: F) -> Self
    where
        F: Fn() -> DeliveryError + Send + Sync + 'static,
    {
        Self {
            sent: Mutex::default(),
            failures_left: Mutex::new(n),
            failure: Some(Box::new(make)),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError> {
        if let Some(make) = &self.failure {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(make());
            }
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
    failure: Option<FailureFactory>,
}

impl RecordingMessenger {
    /// Every send fails with the error built by `make`.
    pub fn failing_with<F>(make: F) -> Self
    where
        F: Fn() -> DeliveryError + Send + Sync + 'static,
    {
        Self {
            sent: Mutex::default(),
            failure: Some(Box::new(make)),
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingClient for RecordingMessenger {
    async fn send_whatsapp(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        if let Some(make) = &self.failure {
            return Err(make());
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<(TextChannel, String, String)>>,
    failure: Option<FailureFactory>,
}

impl RecordingGateway {
    pub fn failing_with<F>(make: F) -> Self
    where
        F: Fn() -> DeliveryError + Send + Sync + 'static,
    {
        Self {
            sent: Mutex::default(),
            failure: Some(Box::new(make)),
        }
    }

    pub fn sent(&self) -> Vec<(TextChannel, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGateway for RecordingGateway {
    async fn send_text(
        &self,
        channel: TextChannel,
        to: &str,
        message: &str,
    ) -> Result<String, DeliveryError> {
        if let Some(make) = &self.failure {
            return Err(make());
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel, to.to_string(), message.to_string()));
        Ok("queued".to_string())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn sample_order(order_number: &str) -> Order {
    let now = Utc::now();
    Order {
        id: 1,
        order_number: order_number.to_string(),
        transaction_id: None,
        order_date: now,
        total_amount: BigDecimal::from_str("259.00").unwrap(),
        items_count: 2,
        payment_method: "COD".to_string(),
        is_paid: false,
        customer_email: "asha@example.com".to_string(),
        customer_name: "Asha".to_string(),
        customer_phone: "+919876543210".to_string(),
        customer_address: "12 Gandhi Road, Chennai".to_string(),
        customer_pincode: "600001".to_string(),
        status: OrderStatus::Confirmed,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_product(id: i32, name: &str, price: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: None,
        price: BigDecimal::from_str(price).unwrap(),
        image: None,
        stock: 10,
        created_at: Utc::now(),
    }
}

pub fn registration_fixture(email: &str, phone: &str) -> Registration {
    Registration {
        name: Some("Kavya".into()),
        email: Some(email.into()),
        phone: Some(phone.into()),
        password: Some("hunter22".into()),
    }
}

/// Fully wired [`AppState`] over in-memory adapters. The notification queue
/// has no worker; queued jobs can be inspected through `jobs`.
pub struct TestApp {
    pub state: web::Data<AppState>,
    pub orders: Arc<InMemoryOrderRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub mailer: Arc<RecordingMailer>,
    pub gateway: Arc<RecordingGateway>,
    pub otp_store: Arc<OtpStore>,
    pub jobs: UnboundedReceiver<NotificationJob>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_gateway(RecordingGateway::default())
    }

    pub fn with_gateway(gateway: RecordingGateway) -> Self {
        let orders = Arc::new(InMemoryOrderRepository::default());
        let users = Arc::new(InMemoryUserRepository::default());
        let products = Arc::new(InMemoryProductRepository::with(vec![
            sample_product(1, "Roasted Almonds", "349.00"),
            Product {
                description: Some("Sun-dried, seedless".into()),
                image: Some("/media/products/raisins.jpg".into()),
                ..sample_product(2, "Golden Raisins", "199.50")
            },
        ]));
        let mailer = Arc::new(RecordingMailer::default());
        let gateway = Arc::new(gateway);
        let otp_store = Arc::new(OtpStore::new(None));
        let store = StoreProfile::default();

        let (queue, jobs) = NotificationQueue::channel();
        let notifier = Notifier::new(queue, store.clone());

        let state = AppState {
            orders: OrderService::new(orders.clone(), notifier.clone()),
            users: UserService::new(users.clone(), notifier.clone()),
            otp: OtpService::new(otp_store.clone(), mailer.clone(), store),
            catalog: CatalogService::new(products),
            relay: RelayService::new(gateway.clone(), notifier),
        };

        Self {
            state: web::Data::new(state),
            orders,
            users,
            mailer,
            gateway,
            otp_store,
            jobs,
        }
    }
}
