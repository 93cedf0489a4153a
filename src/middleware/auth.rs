//! Authentication middleware
//!
//! Resolves the bearer token of a request into the calling staff user and
//! provides the role whitelists handlers check against.

use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{Role, User};
use crate::state::AppState;
use crate::utils::errors::{ChurchAdminError, Result};

/// Roles allowed to create and update records
pub const WRITE_ROLES: &[Role] = &[Role::Admin, Role::Pastor, Role::Editor];

/// Roles allowed to delete, import and export
pub const MANAGE_ROLES: &[Role] = &[Role::Admin, Role::Pastor];

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Fail with 403 unless the caller's role is in `allowed`
    pub fn require(&self, allowed: &[Role]) -> Result<()> {
        if allowed.contains(&self.user.role) {
            debug!(user_id = self.user.id, role = %self.user.role, "Role check passed");
            Ok(())
        } else {
            warn!(user_id = self.user.id, role = %self.user.role, "Role not permitted for this action");
            Err(ChurchAdminError::PermissionDenied(format!(
                "role '{}' may not perform this action",
                self.user.role
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// `?token=` fallback used by download links
fn query_token(parts: &Parts) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ChurchAdminError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| query_token(parts))
            .ok_or_else(|| ChurchAdminError::Authentication("Not authenticated".to_string()))?;

        let user = state.services.auth_service.authenticate(&token).await?;
        Ok(AuthUser { user })
    }
}
