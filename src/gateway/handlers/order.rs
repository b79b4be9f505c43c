//! Order handlers (create, get, list, cancel)

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::super::state::AppState;
use super::super::types::{
    ApiResponse, ApiResult, CreateOrderRequest, PlacedOrderData, created, ok,
    validate_order_request,
};
use super::caller_id;
use crate::core_types::OrderId;
use crate::order::Order;
use crate::user_auth::Claims;

/// Create an order from the submitted cart
///
/// POST /api/v1/orders
///
/// Totals are recomputed server-side; a supplied voucher is validated and,
/// for synchronous settlement, atomically consumed. Losing the redemption
/// race aborts the order with 409 and no side effects.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<PlacedOrderData>),
        (status = 400, description = "Empty cart or ineligible voucher"),
        (status = 409, description = "Voucher redemption lost a race; re-validate and retry"),
        (status = 503, description = "Store or gateway timeout; safe to retry")
    ),
    security(("bearer_jwt" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<PlacedOrderData> {
    let user_id = caller_id(&claims)?;
    let draft = validate_order_request(req)?;

    let placed = state.orders.create(user_id, draft).await?;
    created(PlacedOrderData {
        order: placed.order,
        payment_intent: placed.payment_intent,
    })
}

/// List the caller's orders, newest first
///
/// GET /api/v1/orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders", body = ApiResponse<Vec<Order>>)
    ),
    security(("bearer_jwt" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Vec<Order>> {
    let user_id = caller_id(&claims)?;
    let orders = state.orders.list(user_id).await?;
    ok(orders)
}

/// Fetch one of the caller's orders
///
/// GET /api/v1/orders/{order_id}
#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}",
    params(("order_id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = ApiResponse<Order>),
        (status = 404, description = "Not found or not the caller's order")
    ),
    security(("bearer_jwt" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<OrderId>,
) -> ApiResult<Order> {
    let user_id = caller_id(&claims)?;
    let order = state.orders.get(user_id, order_id).await?;
    ok(order)
}

/// Cancel a pending order
///
/// POST /api/v1/orders/{order_id}/cancel
#[utoipa::path(
    post,
    path = "/api/v1/orders/{order_id}/cancel",
    params(("order_id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<Order>),
        (status = 409, description = "Order already terminal")
    ),
    security(("bearer_jwt" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<OrderId>,
) -> ApiResult<Order> {
    let user_id = caller_id(&claims)?;
    let order = state.orders.cancel(user_id, order_id).await?;
    tracing::info!(order_id, user_id, "order cancelled");
    ok(order)
}
