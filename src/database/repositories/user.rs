//! Staff user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::store::UserStore;
use crate::models::user::{CreateUserRequest, Role, User};
use crate::utils::errors::{ChurchAdminError, Result};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = ChurchAdminError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(ChurchAdminError::Internal)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    /// Create a new staff user
    async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.name)
        .bind(request.email.to_lowercase())
        .bind(request.password_hash)
        .bind(request.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    /// Find user by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Find user by e-mail, case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn count_by_role(&self, role: Role) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
