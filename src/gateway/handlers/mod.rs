//! Route handlers, grouped by resource

pub mod health;
pub mod order;
pub mod payment;
pub mod voucher;

use axum::http::StatusCode;

use super::types::{ApiError, error_codes};
use crate::core_types::UserId;
use crate::user_auth::Claims;

/// Every private handler resolves the caller this way; claims were injected
/// by the JWT middleware.
pub(crate) fn caller_id(claims: &Claims) -> Result<UserId, ApiError> {
    claims.user_id().ok_or_else(|| {
        ApiError::new(
            StatusCode::UNAUTHORIZED,
            error_codes::AUTH_FAILED,
            "Invalid token subject",
        )
    })
}
