//! Gateway types: boundary validation and the unified response envelope
//!
//! - [`PriceDecimal`]: format-validated money for API input
//! - [`ApiResponse<T>`]: unified response wrapper
//! - [`ApiError`]: taxonomy-aware HTTP error with stable `error_codes`

use axum::{Json, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core_types::OrderId;
use crate::error::{ErrorKind, ShopError};
use crate::order::{Order, OrderDraft, OrderItem, SYNC_PAYMENT_METHOD};
use crate::payment::PaymentIntent;
use crate::voucher::VoucherView;

// ============================================================================
// PriceDecimal: Format-Validated Money at the Serde Layer
// ============================================================================

/// Strict-format money amount - validated during deserialization.
///
/// - Rejects `.5` (must be `0.5`) and `5.` (must be `5.0` or `5`)
/// - Rejects negative numbers and empty strings
/// - Accepts both JSON numbers and JSON strings
///
/// The pricing clamps in [`crate::pricing`] are a second line of defense for
/// values that never crossed this boundary.
#[derive(Debug, Clone, Copy)]
pub struct PriceDecimal(Decimal);

impl PriceDecimal {
    pub fn inner(self) -> Decimal {
        self.0
    }

    #[cfg(test)]
    pub fn from_decimal(d: Decimal) -> Self {
        Self(d)
    }
}

impl<'de> Deserialize<'de> for PriceDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DecimalOrString {
            String(String),
            Number(Decimal),
        }

        let value = DecimalOrString::deserialize(deserializer)?;

        match value {
            DecimalOrString::String(s) => {
                if s.is_empty() {
                    return Err(D::Error::custom("Amount cannot be empty"));
                }
                if s.starts_with('.') {
                    return Err(D::Error::custom("Invalid format: use 0.5 not .5"));
                }
                if s.ends_with('.') {
                    return Err(D::Error::custom("Invalid format: use 5.0 not 5."));
                }

                let d = Decimal::from_str(&s)
                    .map_err(|e| D::Error::custom(format!("Invalid decimal: {}", e)))?;

                if d.is_sign_negative() {
                    return Err(D::Error::custom("Amount cannot be negative"));
                }

                Ok(PriceDecimal(d))
            }
            DecimalOrString::Number(d) => {
                if d.is_sign_negative() {
                    return Err(D::Error::custom("Amount cannot be negative"));
                }
                Ok(PriceDecimal(d))
            }
        }
    }
}

impl Serialize for PriceDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as string to preserve precision
        serializer.serialize_str(&self.0.to_string())
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Custom deserializer for non-empty strings
fn deserialize_non_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("string cannot be empty"));
    }
    Ok(s)
}

/// One cart line as submitted at checkout.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClientCartItem {
    #[serde(rename = "productId", deserialize_with = "deserialize_non_empty_string")]
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    /// Unit price - format validated by PriceDecimal
    #[schema(value_type = String)]
    pub price: PriceDecimal,
    pub qty: i64,
}

/// Checkout request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<ClientCartItem>,
    #[serde(rename = "voucherCode")]
    pub voucher_code: Option<String>,
    #[serde(rename = "paymentMethod", default = "default_payment_method")]
    pub payment_method: String,
    #[serde(rename = "idempotencyKey")]
    pub idempotency_key: Option<String>,
}

fn default_payment_method() -> String {
    SYNC_PAYMENT_METHOD.to_string()
}

/// Business validation on top of the serde-layer format checks.
pub fn validate_order_request(req: CreateOrderRequest) -> Result<OrderDraft, ShopError> {
    if req.items.is_empty() {
        return Err(ShopError::validation("Cart items are required"));
    }
    if req.payment_method.is_empty() {
        return Err(ShopError::validation("Payment method is required"));
    }
    let mut items = Vec::with_capacity(req.items.len());
    for item in req.items {
        if item.qty < 1 {
            return Err(ShopError::validation(format!(
                "Quantity must be at least 1 for {}",
                item.product_id
            )));
        }
        items.push(OrderItem {
            product_id: item.product_id,
            name: item.name,
            price: item.price.inner(),
            qty: item.qty,
        });
    }
    Ok(OrderDraft {
        items,
        voucher_code: req.voucher_code,
        payment_method: req.payment_method,
        idempotency_key: req.idempotency_key,
    })
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyVoucherRequest {
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentIntentRequest {
    /// Minor units (paise for INR).
    pub amount: i64,
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyVoucherData {
    pub voucher: VoucherView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlacedOrderData {
    pub order: Order,
    #[serde(rename = "paymentIntent", skip_serializing_if = "Option::is_none")]
    pub payment_intent: Option<PaymentIntent>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentIntentData {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "publishableKey")]
    pub publishable_key: String,
}

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const FORBIDDEN: i32 = 2003;

    // Resource errors (4xxx)
    pub const VOUCHER_NOT_FOUND: i32 = 4001;
    pub const VOUCHER_NOT_USABLE: i32 = 4002;
    pub const VOUCHER_EXPIRED: i32 = 4003;
    pub const ORDER_NOT_FOUND: i32 = 4004;
    pub const REDEEM_CONFLICT: i32 = 4091;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const TRANSIENT: i32 = 5031;
}

// ============================================================================
// ApiError: taxonomy -> HTTP mapping
// ============================================================================

/// HTTP-ready error: status + stable code + message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 with the unified envelope.
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 with the unified envelope.
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

impl From<ShopError> for ApiError {
    fn from(e: ShopError) -> Self {
        use error_codes::*;

        let (status, code) = match e.kind() {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, INVALID_PARAMETER),
            ErrorKind::NotFound => match e {
                ShopError::OrderNotFound => (StatusCode::NOT_FOUND, ORDER_NOT_FOUND),
                _ => (StatusCode::NOT_FOUND, VOUCHER_NOT_FOUND),
            },
            ErrorKind::NotUsable => (StatusCode::BAD_REQUEST, VOUCHER_NOT_USABLE),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, FORBIDDEN),
            ErrorKind::Expired => (StatusCode::BAD_REQUEST, VOUCHER_EXPIRED),
            ErrorKind::Conflict => (StatusCode::CONFLICT, REDEEM_CONFLICT),
            ErrorKind::Transient => (StatusCode::SERVICE_UNAVAILABLE, TRANSIENT),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR),
        };

        // Internal details are logged, never surfaced.
        let msg = if e.kind() == ErrorKind::Internal {
            tracing::error!("internal error: {e:?}");
            "Internal server error".to_string()
        } else {
            e.to_string()
        };

        Self { status, code, msg }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_decimal_rejects_malformed_input() {
        for bad in [r#"".5""#, r#""5.""#, r#""-1.5""#, r#""""#, "-1.5"] {
            let result: Result<PriceDecimal, _> = serde_json::from_str(bad);
            assert!(result.is_err(), "{bad} should be rejected");
        }
        let ok: PriceDecimal = serde_json::from_str(r#""9.99""#).unwrap();
        assert_eq!(ok.inner(), Decimal::new(999, 2));
        let ok: PriceDecimal = serde_json::from_str("9.99").unwrap();
        assert_eq!(ok.inner(), Decimal::new(999, 2));
    }

    #[test]
    fn test_order_request_wire_shape() {
        let json = r#"{
            "items": [{"productId": "margherita-12", "name": "Margherita", "price": 9.99, "qty": 2}],
            "voucherCode": "BOGO-AB12CD",
            "paymentMethod": "test",
            "idempotencyKey": "ik-1"
        }"#;
        let req: CreateOrderRequest = serde_json::from_str(json).unwrap();
        let draft = validate_order_request(req).unwrap();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.voucher_code.as_deref(), Some("BOGO-AB12CD"));
        assert!(draft.is_synchronous());
    }

    #[test]
    fn test_order_request_defaults_payment_method() {
        let json = r#"{"items": [{"productId": "p1", "price": "5.00", "qty": 1}]}"#;
        let req: CreateOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.payment_method, SYNC_PAYMENT_METHOD);
    }

    #[test]
    fn test_order_request_rejects_empty_cart_and_bad_qty() {
        let empty = CreateOrderRequest {
            items: vec![],
            voucher_code: None,
            payment_method: "test".to_string(),
            idempotency_key: None,
        };
        assert!(validate_order_request(empty).is_err());

        let zero_qty = CreateOrderRequest {
            items: vec![ClientCartItem {
                product_id: "p1".to_string(),
                name: String::new(),
                price: PriceDecimal::from_decimal(Decimal::ONE),
                qty: 0,
            }],
            voucher_code: None,
            payment_method: "test".to_string(),
            idempotency_key: None,
        };
        assert!(validate_order_request(zero_qty).is_err());
    }

    #[test]
    fn test_empty_product_id_fails_at_serde_layer() {
        let json = r#"{"items": [{"productId": "", "price": "5.00", "qty": 1}]}"#;
        let result: Result<CreateOrderRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_shop_error_http_mapping() {
        let cases = [
            (ShopError::validation("x"), StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER),
            (ShopError::VoucherNotFound, StatusCode::NOT_FOUND, error_codes::VOUCHER_NOT_FOUND),
            (ShopError::OrderNotFound, StatusCode::NOT_FOUND, error_codes::ORDER_NOT_FOUND),
            (ShopError::VoucherNotUsable, StatusCode::BAD_REQUEST, error_codes::VOUCHER_NOT_USABLE),
            (ShopError::VoucherForbidden, StatusCode::FORBIDDEN, error_codes::FORBIDDEN),
            (ShopError::VoucherExpired, StatusCode::BAD_REQUEST, error_codes::VOUCHER_EXPIRED),
            (ShopError::RedeemConflict, StatusCode::CONFLICT, error_codes::REDEEM_CONFLICT),
            (ShopError::Transient("t".into()), StatusCode::SERVICE_UNAVAILABLE, error_codes::TRANSIENT),
        ];
        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn test_internal_error_message_is_opaque() {
        let api: ApiError = ShopError::Internal("connection string leaked".into()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.msg, "Internal server error");
    }
}
