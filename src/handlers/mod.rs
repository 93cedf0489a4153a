//! HTTP handlers module
//!
//! This module contains the REST handlers organized by resource, plus the
//! router that mounts them under `/api`.

pub mod attendance;
pub mod auth;
pub mod donations;
pub mod events;
pub mod extract;
pub mod groups;
pub mod health;
pub mod members;
pub mod reports;

use axum::extract::{DefaultBodyLimit, OriginalUri};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::middleware::request_logging;
use crate::state::AppState;
use crate::utils::errors::ChurchAdminError;

/// Plain confirmation body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/seed-admin", post(auth::seed_admin))
        .route("/members", get(members::list).post(members::create))
        .route("/members/import", post(members::import))
        .route("/members/export", get(members::export))
        .route("/members/:id", get(members::get).put(members::update).delete(members::delete))
        .route("/groups", get(groups::list).post(groups::create))
        .route("/groups/:id", get(groups::get).put(groups::update).delete(groups::delete))
        .route("/groups/:id/assign", post(groups::assign))
        .route("/groups/:id/remove", post(groups::remove))
        .route("/attendance", get(attendance::by_date).post(attendance::mark))
        .route("/attendance/member/:member_id", get(attendance::by_member))
        .route("/events", get(events::list).post(events::create))
        .route("/events/:id", put(events::update).delete(events::delete))
        .route("/donations", get(donations::list).post(donations::create))
        .route("/donations/export", get(donations::export))
        .route("/donations/:id", put(donations::update).delete(donations::delete))
        .route("/reports/dashboard", get(reports::dashboard))
        .route("/reports/members", get(reports::members))
        .route("/reports/attendance", get(reports::attendance))
        .route("/reports/donations", get(reports::donations))
        .route("/reports/groups", get(reports::groups))
        .route("/reports/events", get(reports::events));

    let body_limit = state.settings.server.body_limit_bytes;
    let cors = cors_layer(&state.settings.server.cors_origins);

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(middleware::from_fn(request_logging))
        .with_state(state)
}

async fn not_found(OriginalUri(uri): OriginalUri) -> ChurchAdminError {
    ChurchAdminError::RouteNotFound(uri.path().to_string())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}
