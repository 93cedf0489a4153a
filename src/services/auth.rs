//! Authentication service implementation
//!
//! This service handles staff login, bcrypt password checks, JWT issuing and
//! verification, and the bootstrap admin account.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::database::store::UserStore;
use crate::models::{CreateUserRequest, LoginRequest, LoginResponse, Role, User, UserSummary};
use crate::utils::errors::{ChurchAdminError, Result};
use crate::utils::helpers::is_valid_email;

pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// JWT claims carried by every access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Outcome of the bootstrap admin request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAdminResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<UserSummary>,
}

/// Authentication service for staff accounts
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    config: AuthConfig,
    hash_cost: u32,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(users: Arc<dyn UserStore>, config: AuthConfig) -> Self {
        Self {
            users,
            config,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Check credentials and issue a token
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let email = request.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ChurchAdminError::validation("A valid email is required"));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(ChurchAdminError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(email = %email, "Login attempt for unknown email");
            return Err(ChurchAdminError::Authentication(INVALID_CREDENTIALS.to_string()));
        };

        if !bcrypt::verify(&request.password, &user.password_hash)? {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(ChurchAdminError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.issue_token(&user)?;
        info!(user_id = user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            token,
            user: UserSummary::from(&user),
        })
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        self.issue_token_at(user, Utc::now())
    }

    /// Issue a token as if it were `issued_at`
    pub fn issue_token_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(self.config.token_ttl_hours)).timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Check signature and expiry
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }

    /// Resolve a token to a user that still exists
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.verify_token(token)?;
        debug!(user_id = claims.sub, "Token verified");

        self.users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ChurchAdminError::Authentication("User not found".to_string()))
    }

    /// Create a staff account with a freshly hashed password
    pub async fn create_user(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User> {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ChurchAdminError::validation(format!("Invalid email: {}", email)));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ChurchAdminError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let password_hash = bcrypt::hash(password, self.hash_cost)?;
        let user = self
            .users
            .create(CreateUserRequest {
                name: name.trim().to_string(),
                email,
                password_hash,
                role,
            })
            .await?;

        info!(user_id = user.id, role = %user.role, "Staff user created");
        Ok(user)
    }

    /// Create the configured admin account unless an admin already exists
    pub async fn seed_admin(&self) -> Result<SeedAdminResponse> {
        if self.users.count_by_role(Role::Admin).await? > 0 {
            return Ok(SeedAdminResponse {
                message: "Admin already exists".to_string(),
                admin: None,
            });
        }

        let (Some(email), Some(password)) = (
            self.config.seed_admin_email.as_deref(),
            self.config.seed_admin_password.as_deref(),
        ) else {
            return Err(ChurchAdminError::validation("No seed admin credentials configured"));
        };
        let name = self.config.seed_admin_name.as_deref().unwrap_or("Admin");

        let admin = self.create_user(name, email, password, Role::Admin).await?;
        warn!(user_id = admin.id, email = %admin.email, "Seed admin account created");

        Ok(SeedAdminResponse {
            message: "Admin created".to_string(),
            admin: Some(UserSummary::from(&admin)),
        })
    }
}
