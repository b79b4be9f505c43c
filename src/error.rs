//! Storefront error taxonomy
//!
//! Every voucher/order failure carries a stable machine-checkable kind plus a
//! human-readable message. Handlers map [`ErrorKind`] to an HTTP status and an
//! `error_codes` constant; nothing is silently swallowed except the documented
//! pricing clamps in [`crate::pricing`].

use thiserror::Error;

/// Machine-checkable failure classification.
///
/// `Conflict` and `Transient` are safe to retry (after a fresh voucher
/// preview for `Conflict`); everything else is terminal for the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    NotUsable,
    Forbidden,
    Expired,
    Conflict,
    Transient,
    Internal,
}

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("{0}")]
    Validation(String),

    #[error("Voucher not found")]
    VoucherNotFound,

    #[error("Voucher is not active")]
    VoucherNotUsable,

    #[error("Voucher not assigned to this user")]
    VoucherForbidden,

    #[error("Voucher has expired")]
    VoucherExpired,

    #[error("Voucher could not be redeemed (possibly used by another request)")]
    RedeemConflict,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Order is not in a state that allows this transition")]
    OrderStateConflict,

    #[error("Operation timed out, safe to retry: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Classify for HTTP mapping and client retry policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::VoucherNotFound | Self::OrderNotFound => ErrorKind::NotFound,
            Self::VoucherNotUsable => ErrorKind::NotUsable,
            Self::VoucherForbidden => ErrorKind::Forbidden,
            Self::VoucherExpired => ErrorKind::Expired,
            Self::RedeemConflict | Self::OrderStateConflict => ErrorKind::Conflict,
            Self::Transient(_) => ErrorKind::Transient,
            // Pool exhaustion and connection drops are retryable; everything
            // else from the store is unexpected.
            Self::Database(e) => match e {
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => ErrorKind::Transient,
                _ => ErrorKind::Internal,
            },
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict | ErrorKind::Transient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ShopError::validation("empty cart").kind(), ErrorKind::Validation);
        assert_eq!(ShopError::VoucherNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ShopError::VoucherNotUsable.kind(), ErrorKind::NotUsable);
        assert_eq!(ShopError::VoucherForbidden.kind(), ErrorKind::Forbidden);
        assert_eq!(ShopError::VoucherExpired.kind(), ErrorKind::Expired);
        assert_eq!(ShopError::RedeemConflict.kind(), ErrorKind::Conflict);
        assert_eq!(ShopError::Transient("db timeout".into()).kind(), ErrorKind::Transient);
        assert_eq!(ShopError::Internal("boom".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_retry_policy() {
        assert!(ShopError::RedeemConflict.is_retryable());
        assert!(ShopError::Transient("timeout".into()).is_retryable());
        assert!(!ShopError::VoucherExpired.is_retryable());
        assert!(!ShopError::validation("bad input").is_retryable());
    }

    #[test]
    fn test_pool_timeout_is_transient() {
        let err = ShopError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(err.is_retryable());
    }
}
