//! Voucher handlers (apply = preview, redeem = consume)

use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::super::state::AppState;
use super::super::types::{
    ApiResponse, ApiResult, ApplyVoucherData, ApplyVoucherRequest, ok,
};
use super::caller_id;
use crate::user_auth::Claims;
use crate::voucher::VoucherView;

/// Validate a voucher for the caller without consuming it
///
/// POST /api/v1/vouchers/apply
#[utoipa::path(
    post,
    path = "/api/v1/vouchers/apply",
    request_body = ApplyVoucherRequest,
    responses(
        (status = 200, description = "Voucher valid", body = ApiResponse<ApplyVoucherData>),
        (status = 400, description = "Voucher inactive, used, or expired"),
        (status = 403, description = "Voucher assigned to another user"),
        (status = 404, description = "Voucher not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Vouchers"
)]
pub async fn apply_voucher(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ApplyVoucherRequest>,
) -> ApiResult<ApplyVoucherData> {
    let user_id = caller_id(&claims)?;

    let voucher = state.vouchers.preview(&req.code, user_id).await?;
    tracing::debug!(code = %voucher.code, user_id, "voucher preview ok");
    ok(ApplyVoucherData {
        voucher: VoucherView::from(&voucher),
    })
}

/// Consume a voucher after a successful deferred payment
///
/// POST /api/v1/vouchers/redeem
#[utoipa::path(
    post,
    path = "/api/v1/vouchers/redeem",
    request_body = ApplyVoucherRequest,
    responses(
        (status = 200, description = "Voucher redeemed", body = ApiResponse<ApplyVoucherData>),
        (status = 400, description = "Voucher not eligible"),
        (status = 409, description = "Lost the redemption race; re-validate and retry")
    ),
    security(("bearer_jwt" = [])),
    tag = "Vouchers"
)]
pub async fn redeem_voucher(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ApplyVoucherRequest>,
) -> ApiResult<ApplyVoucherData> {
    let user_id = caller_id(&claims)?;

    let voucher = state.vouchers.redeem(&req.code, user_id).await?;
    ok(ApplyVoucherData {
        voucher: VoucherView::from(&voucher),
    })
}
