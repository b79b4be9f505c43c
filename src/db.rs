//! Database connection management and schema bootstrap

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Initialize the storefront schema. Idempotent; runs at startup.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing storefront schema...");

    sqlx::query(CREATE_USERS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_VOUCHERS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_ORDERS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_ORDERS_IDEMPOTENCY_INDEX).execute(pool).await?;
    sqlx::query(CREATE_VOUCHERS_ASSIGNED_INDEX).execute(pool).await?;

    tracing::info!("Storefront schema initialized");
    Ok(())
}

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users_tb (
    user_id       BIGSERIAL PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    phone         TEXT,
    password_hash TEXT NOT NULL,
    address       TEXT,
    city          TEXT,
    zip_code      TEXT,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_VOUCHERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS vouchers_tb (
    voucher_id  BIGSERIAL PRIMARY KEY,
    code        TEXT NOT NULL UNIQUE,
    kind        TEXT NOT NULL DEFAULT 'BOGO',
    value       NUMERIC(12,2) NOT NULL DEFAULT 0,
    assigned_to BIGINT REFERENCES users_tb(user_id),
    is_active   BOOLEAN NOT NULL DEFAULT TRUE,
    used        BOOLEAN NOT NULL DEFAULT FALSE,
    expires_at  TIMESTAMPTZ,
    redeemed_at TIMESTAMPTZ,
    redeemed_by BIGINT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders_tb (
    order_id          BIGSERIAL PRIMARY KEY,
    user_id           BIGINT NOT NULL REFERENCES users_tb(user_id),
    items             JSONB NOT NULL,
    subtotal          NUMERIC(12,2) NOT NULL,
    discount          NUMERIC(12,2) NOT NULL DEFAULT 0,
    total             NUMERIC(12,2) NOT NULL,
    voucher_code      TEXT,
    payment_method    TEXT NOT NULL DEFAULT 'test',
    status            TEXT NOT NULL DEFAULT 'PENDING',
    idempotency_key   TEXT,
    payment_intent_id TEXT,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Partial unique index: one order per (user, idempotency key). A concurrent
/// duplicate insert loses with a unique violation and re-reads the winner.
const CREATE_ORDERS_IDEMPOTENCY_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS orders_user_idem_key
    ON orders_tb (user_id, idempotency_key)
    WHERE idempotency_key IS NOT NULL
"#;

/// Supports the "does this user already hold an active unused voucher" check
/// on every login.
const CREATE_VOUCHERS_ASSIGNED_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS vouchers_assigned_active_idx
    ON vouchers_tb (assigned_to)
    WHERE is_active AND NOT used
"#;
