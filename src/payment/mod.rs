//! Payment collaborator boundary
//!
//! The storefront never settles money itself; it asks an external gateway
//! for a payment intent and later checks the intent's status. The gateway
//! sits behind [`PaymentGateway`] so the order path is testable without
//! network access, and every remote call is bounded by the configured
//! request timeout.

mod gateway;

pub use gateway::{
    IntentStatus, PaymentError, PaymentGateway, PaymentIntent, StripeGateway, build_gateway,
};

#[cfg(feature = "mock-payments")]
pub use gateway::MockGateway;

use crate::error::ShopError;

impl From<PaymentError> for ShopError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::Timeout => {
                ShopError::Transient("payment gateway timed out".to_string())
            }
            PaymentError::InvalidAmount => {
                ShopError::validation("A valid positive amount is required")
            }
            PaymentError::Rejected(msg) => ShopError::validation(msg),
            PaymentError::Transport(msg) | PaymentError::Misconfigured(msg) => {
                ShopError::Internal(msg)
            }
        }
    }
}
