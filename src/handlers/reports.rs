//! Report handlers. Every report is read-only and open to any authenticated role.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use super::extract::ApiQuery;
use crate::middleware::AuthUser;
use crate::models::DonationFilter;
use crate::services::aggregation::EventCounts;
use crate::services::reports::*;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn dashboard(State(state): State<AppState>, _auth: AuthUser) -> Result<Json<DashboardReport>> {
    Ok(Json(state.services.report_service.dashboard(Utc::now()).await?))
}

pub async fn members(State(state): State<AppState>, _auth: AuthUser) -> Result<Json<MemberReport>> {
    Ok(Json(state.services.report_service.members(Utc::now()).await?))
}

pub async fn attendance(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<AttendanceReportQuery>,
) -> Result<Json<AttendanceReport>> {
    Ok(Json(state.services.report_service.attendance(query).await?))
}

pub async fn donations(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(filter): ApiQuery<DonationFilter>,
) -> Result<Json<DonationReport>> {
    Ok(Json(state.services.report_service.donations(filter).await?))
}

pub async fn groups(State(state): State<AppState>, _auth: AuthUser) -> Result<Json<GroupReport>> {
    Ok(Json(state.services.report_service.groups().await?))
}

pub async fn events(State(state): State<AppState>, _auth: AuthUser) -> Result<Json<EventCounts>> {
    Ok(Json(state.services.report_service.events(Utc::now()).await?))
}
