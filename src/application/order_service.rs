use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use super::notifier::{whatsapp_link, Notifier};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    generate_order_number, page_offset, NewOrder, Order, OrderDraft, OrderPage, OrderStatus,
};
use crate::domain::ports::OrderRepository;

/// Attempts at drawing a free order number before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub whatsapp_url: String,
}

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    notifier: Notifier,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>, notifier: Notifier) -> Self {
        Self { repo, notifier }
    }

    /// Stores the order, then queues its confirmation notifications.
    ///
    /// The row is committed before anything is queued, so a notification
    /// failure can never undo an order.
    pub fn place_order(&self, draft: OrderDraft) -> Result<PlacedOrder, DomainError> {
        let order = match draft.order_number.clone() {
            Some(number) => self
                .repo
                .insert(new_order(number.clone(), draft))
                .map_err(|e| match e {
                    DomainError::Conflict(_) => DomainError::Conflict(format!(
                        "order_number: order with order number {number} already exists."
                    )),
                    other => other,
                })?,
            None => self.insert_with_generated_number(draft)?,
        };

        info!(
            "Order {} saved: amount {} via {} (paid: {})",
            order.order_number, order.total_amount, order.payment_method, order.is_paid
        );

        self.notifier.order_placed(&order);

        Ok(PlacedOrder {
            whatsapp_url: whatsapp_link(self.notifier.store(), &order),
            order,
        })
    }

    fn insert_with_generated_number(&self, draft: OrderDraft) -> Result<Order, DomainError> {
        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            let number = generate_order_number();
            match self.repo.insert(new_order(number.clone(), draft.clone())) {
                Err(DomainError::Conflict(_)) => {
                    warn!(
                        "Generated order number {} is taken (attempt {}/{})",
                        number, attempt, ORDER_NUMBER_ATTEMPTS
                    );
                }
                result => return result,
            }
        }
        Err(DomainError::Internal(
            "could not allocate a unique order number".to_string(),
        ))
    }

    pub fn get_order(&self, order_number: &str) -> Result<Order, DomainError> {
        self.repo
            .find_by_number(order_number)?
            .ok_or_else(|| DomainError::NotFound("Order not found".to_string()))
    }

    /// Newest first. `page` is 1-based; `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn list_orders(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError> {
        let (page, limit) = (page.max(1), limit.clamp(1, MAX_PAGE_SIZE));
        page_offset(page, limit)?;
        self.repo.list(page, limit)
    }

    pub fn update_status(
        &self,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let order = self
            .repo
            .update_status(order_number, status)?
            .ok_or_else(|| DomainError::NotFound("Order not found".to_string()))?;
        info!("Order {} moved to {}", order.order_number, status);
        Ok(order)
    }
}

fn new_order(order_number: String, draft: OrderDraft) -> NewOrder {
    NewOrder {
        order_number,
        order_date: Utc::now(),
        status: OrderStatus::Confirmed,
        draft,
    }
}
