use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::auth::bearer_token;
use crate::application::order_service::MAX_PAGE_SIZE;
use crate::domain::order::{Order, OrderDraft, OrderStatus, OrderSubmission};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Checkout payload. Numeric fields accept either JSON numbers or numeric strings.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Generated as `HB` + 6 hex characters when omitted.
    pub order_number: Option<String>,
    pub transaction_id: Option<String>,
    #[schema(value_type = f64, example = 259.0)]
    pub total_amount: Option<Value>,
    #[schema(value_type = Option<i32>)]
    pub items_count: Option<Value>,
    /// Cart lines. Only their count is used, as a fallback for `items_count`.
    #[schema(value_type = Option<Vec<Object>>)]
    pub items: Option<Vec<Value>>,
    /// Defaults to `COD`. Only `razorpay` marks the order as paid.
    pub payment_method: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub customer_pincode: Option<String>,
}

impl CreateOrderRequest {
    fn into_submission(self) -> Result<OrderSubmission, AppError> {
        Ok(OrderSubmission {
            total_amount: scalar_text("total_amount", self.total_amount)?,
            items_count: scalar_text("items_count", self.items_count)?,
            item_lines: self.items.map(|items| items.len()),
            order_number: self.order_number,
            transaction_id: self.transaction_id,
            payment_method: self.payment_method,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            customer_address: self.customer_address,
            customer_pincode: self.customer_pincode,
        })
    }
}

/// Accepts `12.5` as well as `"12.5"`; anything else is a 400.
fn scalar_text(field: &str, value: Option<Value>) -> Result<Option<String>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(AppError::BadRequest(format!(
            "{field}: A valid number is required."
        ))),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub id: i64,
    pub order_number: String,
    pub is_paid: bool,
    /// `wa.me` link that opens a chat with the store, pre-filled with the order summary.
    pub whatsapp_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub transaction_id: Option<String>,
    pub order_date: String,
    /// Fixed-point decimal as a string, e.g. "259.00"
    pub total_amount: String,
    pub items_count: i32,
    pub payment_method: String,
    pub is_paid: bool,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_pincode: String,
    pub status: String,
    pub status_display: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            order_number: o.order_number,
            transaction_id: o.transaction_id,
            order_date: o.order_date.to_rfc3339(),
            total_amount: o.total_amount.to_string(),
            items_count: o.items_count,
            payment_method: o.payment_method,
            is_paid: o.is_paid,
            customer_email: o.customer_email,
            customer_name: o.customer_name,
            customer_phone: o.customer_phone,
            customer_address: o.customer_address,
            customer_pincode: o.customer_pincode,
            status: o.status.as_str().to_string(),
            status_display: o.status.label().to_string(),
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of pending, confirmed, processing, shipped, delivered, cancelled.
    pub status: String,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Stores the order with status `confirmed`, then queues the confirmation
/// email and WhatsApp message. Notification problems never fail the request.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Order number already exists"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let draft = OrderDraft::try_from(body.into_inner().into_submission()?)?;

    let placed = web::block(move || state.orders.place_order(draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateOrderResponse {
        success: true,
        id: placed.order.id,
        order_number: placed.order.order_number,
        is_paid: placed.order.is_paid,
        whatsapp_url: placed.whatsapp_url,
    }))
}

/// GET /api/orders/{order_number}
#[utoipa::path(
    get,
    path = "/api/orders/{order_number}",
    params(
        ("order_number" = String, Path, description = "Order number, e.g. HB1A2B3C"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();

    let order = web::block(move || state.orders.get_order(&order_number))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /api/orders
///
/// Newest first. Staff only.
#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not a staff user"),
        (status = 500, description = "Internal server error"),
    ),
    security(("token" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req)?;
    let params = query.into_inner();

    let (result, page, limit) = web::block(move || {
        state.users.require_staff(&token)?;
        let page = params.page.max(1);
        let limit = params.limit.clamp(1, MAX_PAGE_SIZE);
        state
            .orders
            .list_orders(page, limit)
            .map(|result| (result, page, limit))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// PATCH /api/orders/{order_number}/status
///
/// Staff only.
#[utoipa::path(
    patch,
    path = "/api/orders/{order_number}/status",
    params(
        ("order_number" = String, Path, description = "Order number"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not a staff user"),
        (status = 404, description = "Order not found"),
    ),
    security(("token" = [])),
    tag = "orders"
)]
pub async fn update_order_status(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req)?;
    let order_number = path.into_inner();
    let status: OrderStatus = body.status.parse()?;

    let order = web::block(move || {
        state.users.require_staff(&token)?;
        state.orders.update_status(&order_number, status)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
