//! User authentication: registration, login, JWT verification, profile
//!
//! Registration and login also issue the welcome BOGO voucher when the user
//! holds no active unused one.

pub mod handlers;
pub mod middleware;
pub mod service;

pub use service::{Claims, UserAuthService, UserProfile};
