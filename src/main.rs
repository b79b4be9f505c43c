use std::sync::Arc;

use forno::config::AppConfig;
use forno::db::{Database, init_schema};
use forno::gateway;
use forno::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("FORNO_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = AppConfig::load(&env);

    let _log_guard = init_logging(&config);
    tracing::info!("Starting forno (env: {env}, build: {})", env!("GIT_HASH"));

    let db = Arc::new(Database::connect(&config.postgres_url).await?);
    init_schema(db.pool()).await?;

    gateway::run_server(config, db).await
}
