//! Payment handlers: intent creation proxy and deferred-payment confirmation

use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::super::state::AppState;
use super::super::types::{
    ApiResponse, ApiResult, ConfirmPaymentRequest, CreatePaymentIntentRequest, PaymentIntentData,
    ok,
};
use super::caller_id;
use crate::error::ShopError;
use crate::order::Order;
use crate::user_auth::Claims;

/// Create a payment intent with the external collaborator
///
/// POST /api/v1/payments/create-payment-intent
///
/// The amount is taken in minor units exactly as submitted; order creation
/// computes its own amount and does not go through this endpoint.
#[utoipa::path(
    post,
    path = "/api/v1/payments/create-payment-intent",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = ApiResponse<PaymentIntentData>),
        (status = 400, description = "Invalid amount"),
        (status = 503, description = "Gateway timeout; safe to retry")
    ),
    tag = "Payments"
)]
pub async fn create_payment_intent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePaymentIntentRequest>,
) -> ApiResult<PaymentIntentData> {
    let currency = req
        .currency
        .unwrap_or_else(|| state.payment_config.currency.clone());

    let intent = state
        .payments
        .create_intent(req.amount, &currency, req.metadata)
        .await
        .map_err(ShopError::from)?;

    ok(PaymentIntentData {
        client_secret: intent.client_secret,
        publishable_key: intent.publishable_key,
    })
}

/// Confirm a deferred payment and mark the order paid
///
/// POST /api/v1/payments/confirm
#[utoipa::path(
    post,
    path = "/api/v1/payments/confirm",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Order marked paid", body = ApiResponse<Order>),
        (status = 400, description = "Payment not successful"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already terminal"),
        (status = 503, description = "Payment still processing; retry shortly")
    ),
    security(("bearer_jwt" = [])),
    tag = "Payments"
)]
pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> ApiResult<Order> {
    let user_id = caller_id(&claims)?;

    let order = state
        .orders
        .confirm_payment(user_id, req.order_id, &req.payment_intent_id)
        .await?;
    tracing::info!(order_id = order.order_id, user_id, "payment confirmed");
    ok(order)
}
