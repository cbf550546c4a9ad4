use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::contact::{max_len, normalize_phone, require, validate_email};
use super::errors::DomainError;

/// The only payment method that marks an order as paid at intake.
pub const PREPAID_GATEWAY: &str = "razorpay";
pub const DEFAULT_PAYMENT_METHOD: &str = "COD";
pub const ORDER_NUMBER_PREFIX: &str = "HB";

/// NUMERIC(10, 2): at most 8 digits before the decimal point.
const MAX_AMOUNT_EXCLUSIVE: i64 = 100_000_000;
const MAX_INTEGER_DIGITS: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| DomainError::validation(format!("status: \"{s}\" is not a valid choice.")))
    }
}

pub fn is_prepaid(payment_method: &str) -> bool {
    payment_method == PREPAID_GATEWAY
}

/// `HB` followed by six upper-case hex characters.
pub fn generate_order_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{ORDER_NUMBER_PREFIX}{}", hex[..6].to_ascii_uppercase())
}

/// Parses a money amount into a two-place fixed-point decimal.
///
/// The magnitude is bounded from the digit count and exponent before any
/// rescaling, so exponent notation like `1e100000000` is rejected without
/// materialising the number.
pub fn parse_amount(raw: &str) -> Result<BigDecimal, DomainError> {
    let amount = BigDecimal::from_str(raw.trim()).map_err(|e| {
        DomainError::validation(format!("total_amount: \"{raw}\" is not a valid decimal ({e})."))
    })?;
    if amount.is_zero() {
        return Ok(BigDecimal::zero().with_scale(2));
    }

    let (_, scale) = amount.as_bigint_and_exponent();
    let integer_digits = i64::try_from(amount.digits())
        .unwrap_or(i64::MAX)
        .saturating_sub(scale);
    if integer_digits > MAX_INTEGER_DIGITS {
        return Err(too_many_integer_digits());
    }
    // Below 0.001 in magnitude: rounds to zero.
    if integer_digits < -2 {
        return Ok(BigDecimal::zero().with_scale(2));
    }

    let amount = amount.round(2).with_scale(2);
    if amount < BigDecimal::from(0) {
        return Err(DomainError::validation(
            "total_amount: Ensure this value is greater than or equal to 0.",
        ));
    }
    if amount >= BigDecimal::from(MAX_AMOUNT_EXCLUSIVE) {
        return Err(too_many_integer_digits());
    }
    Ok(amount)
}

fn too_many_integer_digits() -> DomainError {
    DomainError::validation(
        "total_amount: Ensure that there are no more than 8 digits before the decimal point.",
    )
}

/// Integers, including integral decimals such as `3.0`.
fn parse_items_count(raw: &str) -> Result<i32, DomainError> {
    let trimmed = raw.trim();
    let integral = match trimmed.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        _ => trimmed,
    };
    let count = integral
        .parse::<i32>()
        .map_err(|_| DomainError::validation(format!("items_count: \"{raw}\" is not a valid integer.")))?;
    if count < 0 {
        return Err(DomainError::validation(
            "items_count: Ensure this value is greater than or equal to 0.",
        ));
    }
    Ok(count)
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checkout payload as received, before any coercion.
#[derive(Debug, Clone, Default)]
pub struct OrderSubmission {
    pub order_number: Option<String>,
    pub transaction_id: Option<String>,
    pub total_amount: Option<String>,
    pub items_count: Option<String>,
    /// Number of entries in an `items` array, when one was sent.
    pub item_lines: Option<usize>,
    pub payment_method: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub customer_pincode: Option<String>,
}

/// A validated order that has not been stored yet.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order_number: Option<String>,
    pub transaction_id: Option<String>,
    pub total_amount: BigDecimal,
    pub items_count: i32,
    pub payment_method: String,
    pub is_paid: bool,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_pincode: String,
}

impl TryFrom<OrderSubmission> for OrderDraft {
    type Error = DomainError;

    fn try_from(s: OrderSubmission) -> Result<Self, Self::Error> {
        let raw_amount = require("total_amount", s.total_amount.as_deref())?;
        let total_amount = parse_amount(raw_amount)?;

        let items_count = match (s.items_count.as_deref(), s.item_lines) {
            (Some(raw), _) if !raw.trim().is_empty() => parse_items_count(raw)?,
            (_, Some(lines)) => i32::try_from(lines)
                .map_err(|_| DomainError::validation("items: too many items."))?,
            _ => 0,
        };

        let customer_name = require("customer_name", s.customer_name.as_deref())?.to_string();
        max_len("customer_name", &customer_name, 100)?;

        let customer_email = require("customer_email", s.customer_email.as_deref())?.to_string();
        validate_email("customer_email", &customer_email)?;

        let customer_pincode =
            require("customer_pincode", s.customer_pincode.as_deref())?.to_string();
        max_len("customer_pincode", &customer_pincode, 10)?;

        let customer_phone = normalize_phone(s.customer_phone.as_deref().unwrap_or("").trim());
        max_len("customer_phone", &customer_phone, 15)?;

        let payment_method =
            optional(s.payment_method).unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
        max_len("payment_method", &payment_method, 20)?;

        let order_number = optional(s.order_number);
        if let Some(number) = &order_number {
            max_len("order_number", number, 50)?;
        }
        let transaction_id = optional(s.transaction_id);
        if let Some(txn) = &transaction_id {
            max_len("transaction_id", txn, 100)?;
        }

        Ok(OrderDraft {
            order_number,
            transaction_id,
            total_amount,
            items_count,
            is_paid: is_prepaid(&payment_method),
            payment_method,
            customer_name,
            customer_email,
            customer_phone,
            customer_address: s.customer_address.unwrap_or_default().trim().to_string(),
            customer_pincode,
        })
    }
}

/// Row-ready order: the draft with its number and initial status resolved.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub draft: OrderDraft,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub transaction_id: Option<String>,
    pub order_date: DateTime<Utc>,
    pub total_amount: BigDecimal,
    pub items_count: i32,
    pub payment_method: String,
    pub is_paid: bool,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_pincode: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub total: i64,
}

/// Rows to skip for a 1-based `page` of `limit` rows.
pub fn page_offset(page: i64, limit: i64) -> Result<i64, DomainError> {
    page.max(1)
        .checked_sub(1)
        .and_then(|skipped| skipped.checked_mul(limit.max(0)))
        .ok_or_else(|| DomainError::validation("page: Page number is out of range."))
}
