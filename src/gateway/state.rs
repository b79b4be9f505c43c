use std::sync::Arc;

use crate::config::PaymentConfig;
use crate::db::Database;
use crate::order::OrderService;
use crate::payment::PaymentGateway;
use crate::user_auth::UserAuthService;
use crate::voucher::VoucherService;

/// Shared gateway application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub user_auth: Arc<UserAuthService>,
    pub vouchers: Arc<VoucherService>,
    pub orders: Arc<OrderService>,
    /// External payment collaborator; also used directly by the raw
    /// payment-intent endpoint.
    pub payments: Arc<dyn PaymentGateway>,
    pub payment_config: PaymentConfig,
}
