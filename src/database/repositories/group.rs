//! Small group repository implementation
//!
//! Membership lives on both sides: `small_groups.member_ids` and
//! `members.small_group_id`. Every operation touching both runs in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::store::{AssignOutcome, GroupStore};
use crate::models::group::{CreateGroupRequest, SmallGroup, UpdateGroupRequest};
use crate::utils::errors::Result;

const GROUP_COLUMNS: &str = "id, name, leader_id, location, meeting_day, meeting_time, member_ids, notes, created_at, updated_at";

#[derive(FromRow)]
struct GroupRow {
    id: i64,
    name: String,
    leader_id: Option<i64>,
    location: Option<String>,
    meeting_day: Option<String>,
    meeting_time: Option<String>,
    member_ids: Vec<i64>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GroupRow> for SmallGroup {
    fn from(row: GroupRow) -> Self {
        SmallGroup {
            id: row.id,
            name: row.name,
            leader_id: row.leader_id,
            location: row.location,
            meeting_day: row.meeting_day,
            meeting_time: row.meeting_time,
            member_ids: row.member_ids,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupStore for GroupRepository {
    /// Create a new group with an empty member set
    async fn create(&self, request: CreateGroupRequest) -> Result<SmallGroup> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            INSERT INTO small_groups (name, leader_id, location, meeting_day, meeting_time, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(request.name)
        .bind(request.leader_id)
        .bind(request.location)
        .bind(request.meeting_day)
        .bind(request.meeting_time)
        .bind(request.notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Find group by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<SmallGroup>> {
        let row = sqlx::query_as::<_, GroupRow>(&format!("SELECT {GROUP_COLUMNS} FROM small_groups WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SmallGroup::from))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<SmallGroup>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, GroupRow>(&format!("SELECT {GROUP_COLUMNS} FROM small_groups WHERE id = ANY($1)"))
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SmallGroup::from).collect())
    }

    /// List groups, optionally filtered by name
    async fn list(&self, search: Option<&str>) -> Result<Vec<SmallGroup>> {
        let pattern = search.map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));

        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM small_groups WHERE ($1::TEXT IS NULL OR name ILIKE $1) ORDER BY name ASC, id ASC"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SmallGroup::from).collect())
    }

    /// Count total groups
    async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM small_groups")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Update group details; the member set is left alone
    async fn update(&self, id: i64, request: UpdateGroupRequest) -> Result<Option<SmallGroup>> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            UPDATE small_groups
            SET name = COALESCE($2, name),
                leader_id = CASE WHEN $3 THEN $4 ELSE leader_id END,
                location = CASE WHEN $5 THEN $6 ELSE location END,
                meeting_day = CASE WHEN $7 THEN $8 ELSE meeting_day END,
                meeting_time = CASE WHEN $9 THEN $10 ELSE meeting_time END,
                notes = CASE WHEN $11 THEN $12 ELSE notes END,
                updated_at = $13
            WHERE id = $1
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.name)
        .bind(request.leader_id.is_some())
        .bind(request.leader_id.flatten())
        .bind(request.location.is_some())
        .bind(request.location.flatten())
        .bind(request.meeting_day.is_some())
        .bind(request.meeting_day.flatten())
        .bind(request.meeting_time.is_some())
        .bind(request.meeting_time.flatten())
        .bind(request.notes.is_some())
        .bind(request.notes.flatten())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SmallGroup::from))
    }

    async fn assign_member(&self, group_id: i64, member_id: i64) -> Result<Option<AssignOutcome>> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<(Option<i64>,)> =
            sqlx::query_as("SELECT small_group_id FROM members WHERE id = $1 FOR UPDATE")
                .bind(member_id)
                .fetch_optional(&mut *tx)
                .await?;

        let row = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            UPDATE small_groups
            SET member_ids = CASE WHEN $2 = ANY(member_ids) THEN member_ids ELSE array_append(member_ids, $2) END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(group_id)
        .bind(member_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            // Dropping the transaction rolls back the row lock
            return Ok(None);
        };

        sqlx::query(
            "UPDATE small_groups SET member_ids = array_remove(member_ids, $2), updated_at = NOW() WHERE id <> $1 AND $2 = ANY(member_ids)",
        )
        .bind(group_id)
        .bind(member_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE members SET small_group_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(group_id)
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(AssignOutcome {
            group: row.into(),
            member_found: previous.is_some(),
            previous_group_id: previous.and_then(|(group,)| group),
        }))
    }

    async fn remove_member(&self, group_id: i64, member_id: i64) -> Result<Option<SmallGroup>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            UPDATE small_groups
            SET member_ids = array_remove(member_ids, $2),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(group_id)
        .bind(member_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("UPDATE members SET small_group_id = NULL, updated_at = NOW() WHERE id = $1")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(row.into()))
    }

    async fn delete_cascade(&self, group_id: i64) -> Result<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM small_groups WHERE id = $1 FOR UPDATE")
            .bind(group_id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let unassigned = sqlx::query("UPDATE members SET small_group_id = NULL, updated_at = NOW() WHERE small_group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM small_groups WHERE id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(unassigned))
    }
}
