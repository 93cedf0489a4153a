//! Small group handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{AuthUser, MANAGE_ROLES, WRITE_ROLES};
use crate::models::*;
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Default, Deserialize)]
pub struct GroupSearch {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupDeleted {
    pub message: String,
    pub unassigned: u64,
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<GroupSearch>,
) -> Result<Json<Vec<GroupView>>> {
    Ok(Json(state.services.membership_service.list_groups(query.search).await?))
}

pub async fn get(State(state): State<AppState>, _auth: AuthUser, ApiPath(id): ApiPath<i64>) -> Result<Json<GroupView>> {
    Ok(Json(state.services.membership_service.get_group(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupView>)> {
    auth.require(WRITE_ROLES)?;
    let group = state.services.membership_service.create_group(request, auth.id()).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateGroupRequest>,
) -> Result<Json<GroupView>> {
    auth.require(WRITE_ROLES)?;
    Ok(Json(state.services.membership_service.update_group(id, request, auth.id()).await?))
}

pub async fn delete(State(state): State<AppState>, auth: AuthUser, ApiPath(id): ApiPath<i64>) -> Result<Json<GroupDeleted>> {
    auth.require(MANAGE_ROLES)?;
    let unassigned = state.services.membership_service.delete_group(id, auth.id()).await?;
    Ok(Json(GroupDeleted {
        message: "Group deleted and members unassigned".to_string(),
        unassigned,
    }))
}

pub async fn assign(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<MembershipRequest>,
) -> Result<Json<GroupView>> {
    auth.require(WRITE_ROLES)?;
    Ok(Json(state.services.membership_service.assign(id, request.member_id, auth.id()).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<MembershipRequest>,
) -> Result<Json<GroupView>> {
    auth.require(WRITE_ROLES)?;
    Ok(Json(state.services.membership_service.remove(id, request.member_id, auth.id()).await?))
}
