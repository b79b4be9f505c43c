//! Forno - Pizza Storefront Backend
//!
//! A storefront service in Rust: auth, vouchers, orders, and payment intents,
//! with server-authoritative pricing and atomic single-use voucher redemption.
//!
//! # Modules
//!
//! - [`core_types`] - Domain id aliases and money rounding helpers
//! - [`pricing`] - The single pricing implementation shared by cart preview and checkout
//! - [`cart`] - Client-held cart store with typed mutations and change events
//! - [`voucher`] - Voucher entity, preview, and atomic redemption
//! - [`order`] - Order entity, checkout orchestration, status transitions
//! - [`payment`] - External payment collaborator behind a trait
//! - [`user_auth`] - Registration, login, JWT middleware, welcome vouchers
//! - [`gateway`] - Axum HTTP gateway: routes, state, response envelope
//! - [`db`] - PostgreSQL pool and schema bootstrap
//! - [`error`] - The storefront error taxonomy

// Core types - must be first!
pub mod core_types;

pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod order;
pub mod payment;
pub mod pricing;
pub mod user_auth;
pub mod voucher;

// Convenient re-exports at crate root
pub use cart::{CartEvent, CartLine, CartStore};
pub use core_types::{OrderId, UserId};
pub use error::{ErrorKind, ShopError};
pub use order::{Order, OrderItem, OrderService, OrderStatus};
pub use pricing::{DiscountKind, Quote, UnitLine};
pub use voucher::{Voucher, VoucherService};
