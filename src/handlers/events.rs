//! Event handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::MessageResponse;
use crate::middleware::{AuthUser, MANAGE_ROLES, WRITE_ROLES};
use crate::models::*;
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    #[serde(default)]
    pub upcoming: Option<bool>,
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<EventListQuery>,
) -> Result<Json<Vec<Event>>> {
    let upcoming = query.upcoming.unwrap_or(false);
    Ok(Json(state.services.event_service.list(upcoming, Utc::now()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    auth.require(WRITE_ROLES)?;
    let event = state.services.event_service.create(request, auth.id()).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateEventRequest>,
) -> Result<Json<Event>> {
    auth.require(WRITE_ROLES)?;
    Ok(Json(state.services.event_service.update(id, request, auth.id()).await?))
}

pub async fn delete(State(state): State<AppState>, auth: AuthUser, ApiPath(id): ApiPath<i64>) -> Result<Json<MessageResponse>> {
    auth.require(MANAGE_ROLES)?;
    state.services.event_service.delete(id, auth.id()).await?;
    Ok(Json(MessageResponse::new("Event deleted")))
}
