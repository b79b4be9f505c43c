//! Voucher management: single-use discount entitlements
//!
//! A voucher transitions `used=false -> used=true` at most once, and only
//! through the conditional update in [`repository::VoucherRepository::redeem`].
//! Everything else (preview, welcome issuance) reads or inserts.

pub mod models;
pub mod repository;
pub mod service;

pub use models::{Voucher, VoucherView, normalize_code};
pub use repository::VoucherRepository;
pub use service::VoucherService;
