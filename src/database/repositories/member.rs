//! Member repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::store::MemberStore;
use crate::models::member::{CreateMemberRequest, Gender, Member, MemberFilter, UpdateMemberRequest};
use crate::utils::errors::{ChurchAdminError, Result};

const MEMBER_COLUMNS: &str = "id, full_name, date_of_birth, gender, phone, address, ministry, small_group_id, profile_photo_url, created_at, updated_at";

// $1 search, $2 gender, $3 ministry, $4 small group
const MEMBER_FILTER: &str = r#"
    ($1::TEXT IS NULL OR full_name ILIKE $1 OR phone ILIKE $1)
    AND ($2::TEXT IS NULL OR gender = $2)
    AND ($3::TEXT IS NULL OR ministry = $3)
    AND ($4::BIGINT IS NULL OR small_group_id = $4)
"#;

#[derive(FromRow)]
struct MemberRow {
    id: i64,
    full_name: String,
    date_of_birth: Option<NaiveDate>,
    gender: String,
    phone: Option<String>,
    address: Option<String>,
    ministry: Option<String>,
    small_group_id: Option<i64>,
    profile_photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for Member {
    type Error = ChurchAdminError;

    fn try_from(row: MemberRow) -> Result<Self> {
        Ok(Member {
            id: row.id,
            full_name: row.full_name,
            date_of_birth: row.date_of_birth,
            gender: row.gender.parse().map_err(ChurchAdminError::Internal)?,
            phone: row.phone,
            address: row.address,
            ministry: row.ministry,
            small_group_id: row.small_group_id,
            profile_photo_url: row.profile_photo_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_members(rows: Vec<MemberRow>) -> Result<Vec<Member>> {
    rows.into_iter().map(Member::try_from).collect()
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberStore for MemberRepository {
    /// Create a new member
    async fn create(&self, request: CreateMemberRequest) -> Result<Member> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            r#"
            INSERT INTO members (full_name, date_of_birth, gender, phone, address, ministry, profile_photo_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(request.full_name)
        .bind(request.date_of_birth)
        .bind(request.gender.as_str())
        .bind(request.phone)
        .bind(request.address)
        .bind(request.ministry)
        .bind(request.profile_photo_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn insert_many(&self, requests: Vec<CreateMemberRequest>) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut inserted = 0u64;

        for request in requests {
            sqlx::query(
                r#"
                INSERT INTO members (full_name, date_of_birth, gender, phone, address, ministry, profile_photo_url, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
                "#,
            )
            .bind(request.full_name)
            .bind(request.date_of_birth)
            .bind(request.gender.as_str())
            .bind(request.phone)
            .bind(request.address)
            .bind(request.ministry)
            .bind(request.profile_photo_url)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Find member by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Member::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Member>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MemberRow>(&format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ANY($1)"))
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        into_members(rows)
    }

    /// List members matching the filter with pagination
    async fn list(&self, filter: &MemberFilter, limit: i64, offset: i64) -> Result<(Vec<Member>, i64)> {
        let search = filter.search.as_deref().map(like_pattern);
        let gender = filter.gender.map(|g| g.as_str());

        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE {MEMBER_FILTER} ORDER BY created_at DESC, id DESC LIMIT $5 OFFSET $6"
        ))
        .bind(search.clone())
        .bind(gender)
        .bind(filter.ministry.clone())
        .bind(filter.small_group_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM members WHERE {MEMBER_FILTER}"))
            .bind(search)
            .bind(gender)
            .bind(filter.ministry.clone())
            .bind(filter.small_group_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((into_members(rows)?, total.0))
    }

    async fn list_all(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!("SELECT {MEMBER_COLUMNS} FROM members ORDER BY created_at DESC, id DESC"))
            .fetch_all(&self.pool)
            .await?;

        into_members(rows)
    }

    /// Count total members
    async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    async fn count_by_gender(&self) -> Result<Vec<(Gender, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT gender, COUNT(*) FROM members GROUP BY gender")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(gender, count)| Ok((gender.parse().map_err(ChurchAdminError::Internal)?, count)))
            .collect()
    }

    /// Update member. `CASE WHEN $flag` distinguishes an explicit clear from an absent field.
    async fn update(&self, id: i64, request: UpdateMemberRequest) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            r#"
            UPDATE members
            SET full_name = COALESCE($2, full_name),
                date_of_birth = CASE WHEN $3 THEN $4 ELSE date_of_birth END,
                gender = COALESCE($5, gender),
                phone = CASE WHEN $6 THEN $7 ELSE phone END,
                address = CASE WHEN $8 THEN $9 ELSE address END,
                ministry = CASE WHEN $10 THEN $11 ELSE ministry END,
                profile_photo_url = CASE WHEN $12 THEN $13 ELSE profile_photo_url END,
                updated_at = $14
            WHERE id = $1
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.full_name)
        .bind(request.date_of_birth.is_some())
        .bind(request.date_of_birth.flatten())
        .bind(request.gender.map(|g| g.as_str()))
        .bind(request.phone.is_some())
        .bind(request.phone.flatten())
        .bind(request.address.is_some())
        .bind(request.address.flatten())
        .bind(request.ministry.is_some())
        .bind(request.ministry.flatten())
        .bind(request.profile_photo_url.is_some())
        .bind(request.profile_photo_url.flatten())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Member::try_from).transpose()
    }

    /// Delete member, pulling its id out of group and event arrays first.
    /// Leader and donation references are nulled and attendance removed by the schema.
    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE small_groups SET member_ids = array_remove(member_ids, $1), updated_at = NOW() WHERE $1 = ANY(member_ids)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE events SET attendee_ids = array_remove(attendee_ids, $1) WHERE $1 = ANY(attendee_ids)")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }
}
