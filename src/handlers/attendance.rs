//! Attendance handlers

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{AuthUser, WRITE_ROLES};
use crate::models::*;
use crate::services::MarkAttendanceResponse;
use crate::state::AppState;
use crate::utils::errors::{ChurchAdminError, Result};
use crate::utils::helpers::de_opt_date;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByDateQuery {
    #[serde(default, deserialize_with = "de_opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub small_group: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    #[serde(default, deserialize_with = "de_opt_date")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub to: Option<NaiveDate>,
}

pub async fn mark(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<MarkAttendanceRequest>,
) -> Result<Json<MarkAttendanceResponse>> {
    auth.require(WRITE_ROLES)?;
    Ok(Json(state.services.attendance_service.mark(request, auth.id()).await?))
}

pub async fn by_date(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ByDateQuery>,
) -> Result<Json<Vec<AttendanceView>>> {
    let date = query
        .date
        .ok_or_else(|| ChurchAdminError::validation("date is required"))?;
    Ok(Json(state.services.attendance_service.by_date(date, query.small_group).await?))
}

pub async fn by_member(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(member_id): ApiPath<i64>,
    ApiQuery(range): ApiQuery<DateRangeQuery>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    Ok(Json(
        state
            .services
            .attendance_service
            .by_member(member_id, range.from, range.to)
            .await?,
    ))
}
