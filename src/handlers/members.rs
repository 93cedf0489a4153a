//! Member handlers

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::MessageResponse;
use crate::middleware::{AuthUser, MANAGE_ROLES, WRITE_ROLES};
use crate::models::*;
use crate::services::CsvFile;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ListMembersQuery>,
) -> Result<Json<MemberPage>> {
    Ok(Json(state.services.member_service.list(query).await?))
}

pub async fn get(State(state): State<AppState>, _auth: AuthUser, ApiPath(id): ApiPath<i64>) -> Result<Json<MemberView>> {
    Ok(Json(state.services.member_service.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateMemberRequest>,
) -> Result<(StatusCode, Json<MemberView>)> {
    auth.require(WRITE_ROLES)?;
    let member = state.services.member_service.create(request, auth.id()).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateMemberRequest>,
) -> Result<Json<MemberView>> {
    auth.require(WRITE_ROLES)?;
    Ok(Json(state.services.member_service.update(id, request, auth.id()).await?))
}

pub async fn delete(State(state): State<AppState>, auth: AuthUser, ApiPath(id): ApiPath<i64>) -> Result<Json<MessageResponse>> {
    auth.require(MANAGE_ROLES)?;
    state.services.member_service.delete(id, auth.id()).await?;
    Ok(Json(MessageResponse::new("Member deleted")))
}

pub async fn import(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<ImportMembersRequest>,
) -> Result<Json<ImportSummary>> {
    auth.require(MANAGE_ROLES)?;
    Ok(Json(state.services.member_service.import(request, auth.id()).await?))
}

pub async fn export(State(state): State<AppState>, auth: AuthUser) -> Result<Response> {
    auth.require(MANAGE_ROLES)?;
    let file = state.services.member_service.export_csv().await?;
    Ok(csv_response(file))
}

/// CSV attachment response shared by the export endpoints
pub(crate) fn csv_response(file: CsvFile) -> Response {
    (
        [
            (CONTENT_TYPE, "text/csv".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file.filename)),
        ],
        file.body,
    )
        .into_response()
}
