use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::product::Product;
use crate::domain::user::{NewUser, User, UserCredentials};
use crate::schema::{auth_tokens, orders, products, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
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
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|_| {
            DomainError::Internal(format!(
                "order {} has unknown status '{}'",
                row.order_number, row.status
            ))
        })?;
        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            transaction_id: row.transaction_id,
            order_date: row.order_date,
            total_amount: row.total_amount,
            items_count: row.items_count,
            payment_method: row.payment_method,
            is_paid: row.is_paid,
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_address: row.customer_address,
            customer_pincode: row.customer_pincode,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
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
    pub status: String,
}

impl From<NewOrder> for NewOrderRow {
    fn from(order: NewOrder) -> Self {
        let draft = order.draft;
        NewOrderRow {
            order_number: order.order_number,
            transaction_id: draft.transaction_id,
            order_date: order.order_date,
            total_amount: draft.total_amount,
            items_count: draft.items_count,
            payment_method: draft.payment_method,
            is_paid: draft.is_paid,
            customer_email: draft.customer_email,
            customer_name: draft.customer_name,
            customer_phone: draft.customer_phone,
            customer_address: draft.customer_address,
            customer_pincode: draft.customer_pincode,
            status: order.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserCredentials {
    fn from(row: UserRow) -> Self {
        UserCredentials {
            password_hash: row.password_hash,
            user: User {
                id: row.id,
                email: row.email,
                name: row.name,
                phone: row.phone,
                is_staff: row.is_staff,
                created_at: row.created_at,
            },
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        UserCredentials::from(row).user
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
}

impl From<NewUser> for NewUserRow {
    fn from(user: NewUser) -> Self {
        NewUserRow {
            email: user.email,
            name: user.name,
            phone: user.phone,
            password_hash: user.password_hash,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = auth_tokens)]
pub struct NewAuthTokenRow<'a> {
    pub key: &'a str,
    pub user_id: i64,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub image: Option<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            image: row.image,
            stock: row.stock,
            created_at: row.created_at,
        }
    }
}
