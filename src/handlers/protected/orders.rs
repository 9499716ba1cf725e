// GET /api/orders and POST /api/orders - the customer's order history

use axum::{extract::Extension, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::Order;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthCustomer};
use crate::services::OrderService;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub spend: Option<Decimal>,
}

/// POST /api/orders - record an order for the authenticated customer
///
/// Expected input: `{"spend": 1500.00}` with a strictly positive amount.
/// Inserts the order row and accumulates the amount onto the customer's
/// `total_spend`.
pub async fn create_order(
    Extension(AuthCustomer(customer)): Extension<AuthCustomer>,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<Value> {
    let spend = validate_spend(payload.spend)?;

    let order = OrderService::new().await?.create_order(customer.id, spend).await?;

    Ok(ApiResponse::created(json!({
        "message": "Order created successfully",
        "order_id": order.id,
    })))
}

/// GET /api/orders - the authenticated customer's orders, newest first
pub async fn list_orders(
    Extension(AuthCustomer(customer)): Extension<AuthCustomer>,
) -> ApiResult<Vec<Order>> {
    let orders = OrderService::new().await?.list_for_customer(customer.id).await?;
    Ok(ApiResponse::success(orders))
}

fn validate_spend(spend: Option<Decimal>) -> Result<Decimal, ApiError> {
    spend
        .filter(|amount| *amount > Decimal::ZERO)
        .ok_or_else(|| ApiError::bad_request("Invalid spend amount"))
}
