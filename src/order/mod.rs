//! Order management: server-authoritative pricing and checkout
//!
//! The order path is the only writer of `orders_tb` and the only caller of
//! the voucher redemption update. Totals are always recomputed here from the
//! submitted items; nothing price-shaped is trusted from the client.

pub mod models;
pub mod repository;
pub mod service;

pub use models::{Order, OrderDraft, OrderItem, OrderStatus, SYNC_PAYMENT_METHOD};
pub use repository::OrderRepository;
pub use service::{OrderService, PlacedOrder};
