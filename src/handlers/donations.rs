//! Donation handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::members::csv_response;
use super::MessageResponse;
use crate::middleware::{AuthUser, MANAGE_ROLES, WRITE_ROLES};
use crate::models::*;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(filter): ApiQuery<DonationFilter>,
) -> Result<Json<Vec<Donation>>> {
    Ok(Json(state.services.donation_service.list(filter).await?))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateDonationRequest>,
) -> Result<(StatusCode, Json<Donation>)> {
    auth.require(WRITE_ROLES)?;
    let donation = state.services.donation_service.create(request, auth.id()).await?;
    Ok((StatusCode::CREATED, Json(donation)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateDonationRequest>,
) -> Result<Json<Donation>> {
    auth.require(WRITE_ROLES)?;
    Ok(Json(state.services.donation_service.update(id, request, auth.id()).await?))
}

pub async fn delete(State(state): State<AppState>, auth: AuthUser, ApiPath(id): ApiPath<i64>) -> Result<Json<MessageResponse>> {
    auth.require(MANAGE_ROLES)?;
    state.services.donation_service.delete(id, auth.id()).await?;
    Ok(Json(MessageResponse::new("Donation deleted")))
}

pub async fn export(State(state): State<AppState>, auth: AuthUser) -> Result<Response> {
    auth.require(MANAGE_ROLES)?;
    let file = state.services.donation_service.export_csv().await?;
    Ok(csv_response(file))
}
