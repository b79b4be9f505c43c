use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::core_types::UserId;
use crate::pricing::DiscountKind;

/// Normalize a client-supplied voucher code for lookup and storage: trimmed,
/// upper-cased. Applied at every boundary so `" bogo-x1 "` and `"BOGO-X1"`
/// compare equal.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Stored voucher record. Never deleted; redeemed vouchers remain as audit
/// rows with `used=true, is_active=false`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Voucher {
    pub voucher_id: i64,
    pub code: String,
    /// Stored as TEXT; unknown kinds price to a discount of 0.
    pub kind: String,
    pub value: Decimal,
    /// NULL = usable by any account.
    pub assigned_to: Option<UserId>,
    pub is_active: bool,
    pub used: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub redeemed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Voucher {
    pub fn discount_kind(&self) -> Option<DiscountKind> {
        DiscountKind::parse(&self.kind)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }
}

/// Client-facing voucher view (apply/register/login responses).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VoucherView {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Decimal,
    #[serde(rename = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Voucher> for VoucherView {
    fn from(v: &Voucher) -> Self {
        Self {
            code: v.code.clone(),
            kind: v.kind.clone(),
            value: v.value,
            expires_at: v.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn voucher(expires_at: Option<DateTime<Utc>>) -> Voucher {
        Voucher {
            voucher_id: 1,
            code: "BOGO-TEST01".to_string(),
            kind: "BOGO".to_string(),
            value: Decimal::ZERO,
            assigned_to: None,
            is_active: true,
            used: false,
            expires_at,
            redeemed_at: None,
            redeemed_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  bogo-ab12cd \n"), "BOGO-AB12CD");
        assert_eq!(normalize_code("SAVE20"), "SAVE20");
    }

    #[test]
    fn test_expiry_check() {
        let now = Utc::now();
        assert!(voucher(Some(now - Duration::hours(1))).is_expired(now));
        assert!(!voucher(Some(now + Duration::hours(1))).is_expired(now));
        assert!(!voucher(None).is_expired(now));
    }

    #[test]
    fn test_unknown_kind_prices_to_none() {
        let mut v = voucher(None);
        v.kind = "MYSTERY".to_string();
        assert_eq!(v.discount_kind(), None);
    }
}
