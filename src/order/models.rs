use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{OrderId, UserId};
use crate::pricing::UnitLine;

/// The payment method that settles synchronously at checkout. Orders placed
/// with it are created directly as PAID; every other method defers.
pub const SYNC_PAYMENT_METHOD: &str = "test";

/// A single order line, stored verbatim inside the order's JSONB `items`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub qty: i64,
}

impl OrderItem {
    pub fn unit_line(&self) -> UnitLine {
        UnitLine::new(self.price, self.qty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Persisted order. Immutable once PAID except `updated_at`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    #[schema(value_type = Vec<OrderItem>)]
    pub items: sqlx::types::Json<Vec<OrderItem>>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub voucher_code: Option<String>,
    pub payment_method: String,
    /// "PENDING" | "PAID" | "CANCELLED"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::parse(&self.status)
    }
}

/// Validated checkout input handed from the HTTP boundary to the service.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub items: Vec<OrderItem>,
    pub voucher_code: Option<String>,
    pub payment_method: String,
    pub idempotency_key: Option<String>,
}

impl OrderDraft {
    pub fn is_synchronous(&self) -> bool {
        self.payment_method == SYNC_PAYMENT_METHOD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [OrderStatus::Pending, OrderStatus::Paid, OrderStatus::Cancelled] {
            assert_eq!(OrderStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(OrderStatus::parse("SHIPPED"), None);
    }

    #[test]
    fn test_item_wire_shape() {
        let json = r#"{"productId":"margherita-12","name":"Margherita 12\"","price":9.99,"qty":2}"#;
        let item: OrderItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.product_id, "margherita-12");
        assert_eq!(item.qty, 2);

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["productId"], "margherita-12");
    }

    #[test]
    fn test_sync_method_detection() {
        let draft = OrderDraft {
            items: vec![],
            voucher_code: None,
            payment_method: SYNC_PAYMENT_METHOD.to_string(),
            idempotency_key: None,
        };
        assert!(draft.is_synchronous());

        let card = OrderDraft {
            payment_method: "card".to_string(),
            ..draft
        };
        assert!(!card.is_synchronous());
    }
}
