//! Auth handlers: login, logout, me.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use sessionhub_core::error::AppError;
use sessionhub_entity::identity::Identity;

use crate::dto::request::LoginRequest;
use crate::error::ApiError;
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let details = state
        .sessions
        .login(&req.username, &req.password, &req.role)
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: details.token,
        expires_at: details.expires_at,
        identity: details.identity,
    })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.sessions.revoke(&auth.token).await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out successfully".to_string(),
    })))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<Identity>> {
    Json(ApiResponse::ok(auth.identity))
}
