use axum::{Extension, Json, extract::State, http::StatusCode};
use std::sync::Arc;
use validator::Validate;

use super::service::{
    AuthResponse, ChangePasswordRequest, Claims, LoginRequest, RegisterRequest,
    UpdateProfileRequest, UserProfile,
};
use crate::gateway::types::error_codes;
use crate::gateway::{state::AppState, types::ApiResponse};

type HandlerResult<T> =
    Result<(StatusCode, Json<ApiResponse<T>>), (StatusCode, Json<ApiResponse<()>>)>;

fn validation_failure<T>(errors: validator::ValidationErrors) -> HandlerResult<T> {
    let msg = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid {field}"))
            })
        })
        .collect::<Vec<_>>()
        .join("; ");
    Err((
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(error_codes::INVALID_PARAMETER, msg)),
    ))
}

/// Register a new user
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered, welcome voucher usually attached", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> HandlerResult<AuthResponse> {
    if let Err(errors) = req.validate() {
        return validation_failure(errors);
    }

    match state.user_auth.register(req).await {
        Ok(resp) => Ok((StatusCode::CREATED, Json(ApiResponse::success(resp)))),
        Err(e) => {
            let err_msg = e.to_string();
            if err_msg.contains("do not match") {
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<()>::error(
                        error_codes::INVALID_PARAMETER,
                        "Passwords do not match",
                    )),
                ))
            } else if format!("{e:?}").contains("duplicate key") {
                tracing::warn!("registration attempt for existing email");
                Err((
                    StatusCode::CONFLICT,
                    Json(ApiResponse::<()>::error(
                        error_codes::INVALID_PARAMETER,
                        "User already exists with this email",
                    )),
                ))
            } else {
                tracing::error!("Registration failed: {:?}", e);
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::error(
                        error_codes::INTERNAL_ERROR,
                        "Registration failed",
                    )),
                ))
            }
        }
    }
}

/// Login user
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> HandlerResult<AuthResponse> {
    if let Err(errors) = req.validate() {
        return validation_failure(errors);
    }

    match state.user_auth.login(req).await {
        Ok(resp) => Ok((StatusCode::OK, Json(ApiResponse::success(resp)))),
        Err(e) => {
            tracing::warn!("Login failed: {:?}", e);
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::error(
                    error_codes::AUTH_FAILED,
                    "Invalid email or password",
                )),
            ))
        }
    }
}

/// Get the current user's profile
///
/// GET /api/v1/auth/me
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Profile", body = ApiResponse<UserProfile>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Auth"
)]
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> HandlerResult<UserProfile> {
    let user_id = claims.user_id().unwrap_or_default();

    match state.user_auth.get_profile(user_id).await {
        Ok(Some(profile)) => Ok((StatusCode::OK, Json(ApiResponse::success(profile)))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_PARAMETER,
                "User not found",
            )),
        )),
        Err(e) => {
            tracing::error!("Get user failed: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    error_codes::INTERNAL_ERROR,
                    "Error fetching user",
                )),
            ))
        }
    }
}

/// Update profile fields
///
/// PUT /api/v1/auth/profile
#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserProfile>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Auth"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> HandlerResult<UserProfile> {
    if let Err(errors) = req.validate() {
        return validation_failure(errors);
    }
    let user_id = claims.user_id().unwrap_or_default();

    match state.user_auth.update_profile(user_id, req).await {
        Ok(Some(profile)) => Ok((StatusCode::OK, Json(ApiResponse::success(profile)))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_PARAMETER,
                "User not found",
            )),
        )),
        Err(e) => {
            tracing::error!("Update profile failed: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    error_codes::INTERNAL_ERROR,
                    "Error updating profile",
                )),
            ))
        }
    }
}

/// Change password
///
/// POST /api/v1/auth/change-password
#[utoipa::path(
    post,
    path = "/api/v1/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Current password incorrect"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_jwt" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangePasswordRequest>,
) -> HandlerResult<()> {
    if let Err(errors) = req.validate() {
        return validation_failure(errors);
    }
    let user_id = claims.user_id().unwrap_or_default();

    match state.user_auth.change_password(user_id, req).await {
        Ok(()) => Ok((StatusCode::OK, Json(ApiResponse::success(())))),
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("incorrect") {
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<()>::error(
                        error_codes::INVALID_PARAMETER,
                        "Current password is incorrect",
                    )),
                ))
            } else {
                tracing::error!("Change password failed: {:?}", e);
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::error(
                        error_codes::INTERNAL_ERROR,
                        "Error changing password",
                    )),
                ))
            }
        }
    }
}
