use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PaymentConfig;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment gateway request timed out")]
    Timeout,

    #[error("A valid positive amount is required")]
    InvalidAmount,

    #[error("Payment gateway rejected the request: {0}")]
    Rejected(String),

    #[error("Payment gateway transport error: {0}")]
    Transport(String),

    #[error("Payment gateway misconfigured: {0}")]
    Misconfigured(String),
}

/// Handle returned to the client for a deferred payment.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PaymentIntent {
    pub id: String,
    /// Minor units (paise for INR).
    pub amount: i64,
    pub currency: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "publishableKey")]
    pub publishable_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentStatus {
    Succeeded,
    Processing,
    Failed,
}

/// External payment collaborator seam.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for `amount` minor units.
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError>;

    /// Look up the settlement status of an intent.
    async fn retrieve_status(&self, intent_id: &str) -> Result<IntentStatus, PaymentError>;
}

/// Pick a gateway from config. Unknown providers are a startup error, not a
/// silent mock fallback.
pub fn build_gateway(config: &PaymentConfig) -> Result<Box<dyn PaymentGateway>, PaymentError> {
    match config.provider.as_str() {
        "stripe" => Ok(Box::new(StripeGateway::new(config)?)),
        #[cfg(feature = "mock-payments")]
        "mock" => Ok(Box::new(MockGateway::new())),
        other => Err(PaymentError::Misconfigured(format!(
            "unknown payment provider: {other}"
        ))),
    }
}

// ============================================================================
// Stripe
// ============================================================================

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    publishable_key: String,
}

#[derive(Debug, Deserialize)]
struct StripeIntent {
    id: String,
    amount: i64,
    currency: String,
    client_secret: Option<String>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: String,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let secret_key = config
            .stripe_secret_key
            .clone()
            .ok_or_else(|| PaymentError::Misconfigured("stripe_secret_key is not set".into()))?;
        let publishable_key = config.stripe_publishable_key.clone().ok_or_else(|| {
            PaymentError::Misconfigured("stripe_publishable_key is not set".into())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            secret_key,
            publishable_key,
        })
    }

    async fn parse_intent(&self, resp: reqwest::Response) -> Result<StripeIntent, PaymentError> {
        if resp.status().is_success() {
            resp.json::<StripeIntent>()
                .await
                .map_err(|e| PaymentError::Transport(e.to_string()))
        } else {
            let body = resp
                .json::<StripeErrorBody>()
                .await
                .map_err(|e| PaymentError::Transport(e.to_string()))?;
            Err(PaymentError::Rejected(body.error.message))
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError> {
        if amount < 1 {
            return Err(PaymentError::InvalidAmount);
        }

        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), amount.to_string()),
            ("currency".into(), currency.to_lowercase()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
        ];
        for (k, v) in metadata {
            form.push((format!("metadata[{k}]"), v));
        }

        let resp = self
            .client
            .post(format!("{STRIPE_API_BASE}/payment_intents"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(classify_reqwest)?;

        let intent = self.parse_intent(resp).await?;
        let client_secret = intent
            .client_secret
            .ok_or_else(|| PaymentError::Transport("intent missing client_secret".into()))?;

        Ok(PaymentIntent {
            id: intent.id,
            amount: intent.amount,
            currency: intent.currency,
            client_secret,
            publishable_key: self.publishable_key.clone(),
        })
    }

    async fn retrieve_status(&self, intent_id: &str) -> Result<IntentStatus, PaymentError> {
        let resp = self
            .client
            .get(format!("{STRIPE_API_BASE}/payment_intents/{intent_id}"))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(classify_reqwest)?;

        let intent = self.parse_intent(resp).await?;
        Ok(match intent.status.as_str() {
            "succeeded" => IntentStatus::Succeeded,
            "canceled" | "requires_payment_method" => IntentStatus::Failed,
            _ => IntentStatus::Processing,
        })
    }
}

fn classify_reqwest(e: reqwest::Error) -> PaymentError {
    if e.is_timeout() {
        PaymentError::Timeout
    } else {
        PaymentError::Transport(e.to_string())
    }
}

// ============================================================================
// Mock gateway (dev/test)
// ============================================================================

/// In-process simulator: every intent it creates reports `Succeeded`.
/// Gated behind the `mock-payments` feature so production builds cannot
/// accidentally ship it.
#[cfg(feature = "mock-payments")]
pub struct MockGateway {
    intents: dashmap::DashMap<String, i64>,
}

#[cfg(feature = "mock-payments")]
impl MockGateway {
    pub fn new() -> Self {
        Self {
            intents: dashmap::DashMap::new(),
        }
    }
}

#[cfg(feature = "mock-payments")]
impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "mock-payments")]
#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        _metadata: HashMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError> {
        if amount < 1 {
            return Err(PaymentError::InvalidAmount);
        }
        let id = format!("pi_mock_{}", uuid::Uuid::new_v4().simple());
        self.intents.insert(id.clone(), amount);
        Ok(PaymentIntent {
            id: id.clone(),
            amount,
            currency: currency.to_lowercase(),
            client_secret: format!("{id}_secret"),
            publishable_key: "pk_mock".to_string(),
        })
    }

    async fn retrieve_status(&self, intent_id: &str) -> Result<IntentStatus, PaymentError> {
        if self.intents.contains_key(intent_id) {
            Ok(IntentStatus::Succeeded)
        } else {
            Ok(IntentStatus::Failed)
        }
    }
}

#[cfg(all(test, feature = "mock-payments"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_intent_round_trip() {
        let gw = MockGateway::new();
        let intent = gw
            .create_intent(4999, "INR", HashMap::new())
            .await
            .expect("create intent");
        assert_eq!(intent.amount, 4999);
        assert_eq!(intent.currency, "inr");
        assert!(intent.client_secret.ends_with("_secret"));

        let status = gw.retrieve_status(&intent.id).await.expect("status");
        assert_eq!(status, IntentStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_mock_rejects_non_positive_amount() {
        let gw = MockGateway::new();
        let err = gw.create_intent(0, "inr", HashMap::new()).await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount));
    }

    #[tokio::test]
    async fn test_mock_unknown_intent_is_failed() {
        let gw = MockGateway::new();
        let status = gw.retrieve_status("pi_missing").await.expect("status");
        assert_eq!(status, IntentStatus::Failed);
    }

    #[test]
    fn test_unknown_provider_is_a_startup_error() {
        let config = crate::config::PaymentConfig {
            provider: "paypal".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            build_gateway(&config).map(|_| ()),
            Err(PaymentError::Misconfigured(_))
        ));
    }
}
