use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, error_codes, ok};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthData {
    pub status: &'static str,
}

/// Health check
///
/// GET /api/v1/health
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthData>),
        (status = 503, description = "Store unreachable")
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<HealthData> {
    match state.db.health_check().await {
        Ok(()) => ok(HealthData { status: "ok" }),
        Err(e) => {
            tracing::warn!("health check failed: {e}");
            Err(super::super::types::ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                error_codes::SERVICE_UNAVAILABLE,
                "Store unreachable",
            ))
        }
    }
}
