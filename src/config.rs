use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL for users/vouchers/orders
    pub postgres_url: String,
    pub auth: AuthConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    /// Upper bound on any single store operation in the order path (ms).
    /// Elapsed timeouts surface as TRANSIENT, safe to retry.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 {
    24
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentConfig {
    /// "stripe" or "mock" (mock requires the `mock-payments` feature)
    pub provider: String,
    pub currency: String,
    #[serde(default)]
    pub stripe_secret_key: Option<String>,
    #[serde(default)]
    pub stripe_publishable_key: Option<String>,
    /// Bound on the external payment-intent call (ms).
    #[serde(default = "default_payment_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_payment_timeout_ms() -> u64 {
    10_000
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            currency: "inr".to_string(),
            stripe_secret_key: None,
            stripe_publishable_key: None,
            request_timeout_ms: default_payment_timeout_ms(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}
