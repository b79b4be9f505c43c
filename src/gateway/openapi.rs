//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::health::HealthData;
use crate::gateway::types::{
    ApplyVoucherData, ApplyVoucherRequest, ConfirmPaymentRequest, CreateOrderRequest,
    CreatePaymentIntentRequest, PaymentIntentData, PlacedOrderData,
};
use crate::order::{Order, OrderItem};
use crate::payment::PaymentIntent;
use crate::user_auth::UserProfile;
use crate::user_auth::service::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
};
use crate::voucher::VoucherView;

/// JWT bearer security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Forno Storefront API",
        version = "1.0.0",
        description = "Pizza storefront backend: auth, vouchers, orders, and payment intents with server-authoritative pricing.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::login,
        crate::user_auth::handlers::get_current_user,
        crate::user_auth::handlers::update_profile,
        crate::user_auth::handlers::change_password,
        crate::gateway::handlers::voucher::apply_voucher,
        crate::gateway::handlers::voucher::redeem_voucher,
        crate::gateway::handlers::order::create_order,
        crate::gateway::handlers::order::list_orders,
        crate::gateway::handlers::order::get_order,
        crate::gateway::handlers::order::cancel_order,
        crate::gateway::handlers::payment::create_payment_intent,
        crate::gateway::handlers::payment::confirm_payment,
    ),
    components(
        schemas(
            HealthData,
            RegisterRequest,
            LoginRequest,
            UpdateProfileRequest,
            ChangePasswordRequest,
            AuthResponse,
            ApplyVoucherRequest,
            ApplyVoucherData,
            CreateOrderRequest,
            PlacedOrderData,
            CreatePaymentIntentRequest,
            ConfirmPaymentRequest,
            PaymentIntentData,
            Order,
            OrderItem,
            PaymentIntent,
            UserProfile,
            VoucherView,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health checks"),
        (name = "Auth", description = "Registration, login, profile (JWT)"),
        (name = "Vouchers", description = "Voucher preview and redemption (auth required)"),
        (name = "Orders", description = "Checkout and order queries (auth required)"),
        (name = "Payments", description = "Payment-intent collaborator boundary")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Forno Storefront API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_endpoints_registered() {
        let spec = ApiDoc::openapi();
        let paths = spec.paths;
        assert!(paths.paths.contains_key("/api/v1/health"));
        assert!(paths.paths.contains_key("/api/v1/vouchers/apply"));
        assert!(paths.paths.contains_key("/api/v1/orders"));
        assert!(paths.paths.contains_key("/api/v1/payments/create-payment-intent"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("should have components");
        assert!(components.security_schemes.contains_key("bearer_jwt"));
    }
}
