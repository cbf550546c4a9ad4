use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

/// Catalog entry. The `products` table is maintained outside this service.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub image: Option<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}
