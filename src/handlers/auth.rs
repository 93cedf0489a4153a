//! Authentication handlers

use axum::extract::State;
use axum::Json;

use super::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::models::{LoginRequest, LoginResponse, User};
use crate::services::SeedAdminResponse;
use crate::state::AppState;
use crate::utils::errors::Result;

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> Result<Json<LoginResponse>> {
    let response = state.services.auth_service.login(request).await?;
    Ok(Json(response))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}

/// POST /api/auth/seed-admin
pub async fn seed_admin(State(state): State<AppState>) -> Result<Json<SeedAdminResponse>> {
    let response = state.services.auth_service.seed_admin().await?;
    Ok(Json(response))
}
