pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::db::Database;
use crate::order::OrderService;
use crate::payment::build_gateway;
use crate::user_auth::UserAuthService;
use crate::voucher::VoucherService;
use state::AppState;

/// Start the HTTP gateway.
pub async fn run_server(config: AppConfig, db: Arc<Database>) -> anyhow::Result<()> {
    let store_timeout = Duration::from_millis(config.store_timeout_ms);
    let pool = db.pool().clone();

    let payments: Arc<dyn crate::payment::PaymentGateway> =
        Arc::from(build_gateway(&config.payment).map_err(|e| anyhow::anyhow!("{e}"))?);

    let vouchers = Arc::new(VoucherService::new(pool.clone(), store_timeout));
    let orders = Arc::new(OrderService::new(
        pool.clone(),
        vouchers.clone(),
        payments.clone(),
        config.payment.currency.clone(),
        store_timeout,
    ));
    let user_auth = Arc::new(UserAuthService::new(
        pool,
        config.auth.jwt_secret.clone(),
        config.auth.token_ttl_hours,
        vouchers.clone(),
    ));

    let state = Arc::new(AppState {
        db,
        user_auth,
        vouchers,
        orders,
        payments,
        payment_config: config.payment.clone(),
    });

    // ==========================================================================
    // Public routes (no auth)
    // ==========================================================================
    let auth_routes = Router::new()
        .route("/register", post(crate::user_auth::handlers::register))
        .route("/login", post(crate::user_auth::handlers::login));

    let payment_routes = Router::new().route(
        "/create-payment-intent",
        post(handlers::payment::create_payment_intent),
    );

    // ==========================================================================
    // Private routes (JWT required)
    // ==========================================================================
    let profile_routes = Router::new()
        .route("/me", get(crate::user_auth::handlers::get_current_user))
        .route("/profile", put(crate::user_auth::handlers::update_profile))
        .route(
            "/change-password",
            post(crate::user_auth::handlers::change_password),
        )
        .layer(from_fn_with_state(
            state.clone(),
            crate::user_auth::middleware::jwt_auth_middleware,
        ));

    let voucher_routes = Router::new()
        .route("/apply", post(handlers::voucher::apply_voucher))
        .route("/redeem", post(handlers::voucher::redeem_voucher))
        .layer(from_fn_with_state(
            state.clone(),
            crate::user_auth::middleware::jwt_auth_middleware,
        ));

    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::order::create_order).get(handlers::order::list_orders),
        )
        .route("/{order_id}", get(handlers::order::get_order))
        .route("/{order_id}/cancel", post(handlers::order::cancel_order))
        .layer(from_fn_with_state(
            state.clone(),
            crate::user_auth::middleware::jwt_auth_middleware,
        ));

    let confirm_routes = Router::new()
        .route("/confirm", post(handlers::payment::confirm_payment))
        .layer(from_fn_with_state(
            state.clone(),
            crate::user_auth::middleware::jwt_auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, axum::http::header::AUTHORIZATION])
        .allow_origin(Any)
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/api/v1/health", get(handlers::health::health_check))
        .nest("/api/v1/auth", auth_routes.merge(profile_routes))
        .nest("/api/v1/vouchers", voucher_routes)
        .nest("/api/v1/orders", order_routes)
        .nest("/api/v1/payments", payment_routes.merge(confirm_routes))
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()));

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Gateway listening on http://{addr}");
    tracing::info!("API docs: http://{addr}/docs");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        tracing::info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
