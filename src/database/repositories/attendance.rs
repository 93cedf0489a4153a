//! Attendance repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::store::AttendanceStore;
use crate::models::attendance::{AttendanceFilter, AttendanceMark, AttendanceRecord};
use crate::utils::errors::{ChurchAdminError, Result};

const ATTENDANCE_COLUMNS: &str = "id, attendance_date, member_id, small_group_id, status, notes, created_at, updated_at";

#[derive(FromRow)]
struct AttendanceRow {
    id: i64,
    attendance_date: NaiveDate,
    member_id: i64,
    small_group_id: Option<i64>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = ChurchAdminError;

    fn try_from(row: AttendanceRow) -> Result<Self> {
        Ok(AttendanceRecord {
            id: row.id,
            date: row.attendance_date,
            member_id: row.member_id,
            small_group_id: row.small_group_id,
            status: row.status.parse().map_err(ChurchAdminError::Internal)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_records(rows: Vec<AttendanceRow>) -> Result<Vec<AttendanceRecord>> {
    rows.into_iter().map(AttendanceRecord::try_from).collect()
}

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for AttendanceRepository {
    /// Single-statement upsert against the (date, member, group-or-0) unique index
    async fn upsert(&self, mark: AttendanceMark) -> Result<AttendanceRecord> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            INSERT INTO attendance (attendance_date, member_id, small_group_id, status, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (attendance_date, member_id, (COALESCE(small_group_id, 0)))
            DO UPDATE SET status = EXCLUDED.status,
                          notes = COALESCE(EXCLUDED.notes, attendance.notes),
                          updated_at = EXCLUDED.updated_at
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        ))
        .bind(mark.date)
        .bind(mark.member_id)
        .bind(mark.small_group_id)
        .bind(mark.status.as_str())
        .bind(mark.notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_date(&self, date: NaiveDate, small_group_id: Option<i64>) -> Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS} FROM attendance
            WHERE attendance_date = $1 AND ($2::BIGINT IS NULL OR small_group_id = $2)
            ORDER BY id ASC
            "#
        ))
        .bind(date)
        .bind(small_group_id)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn find_by_member(&self, member_id: i64, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS} FROM attendance
            WHERE member_id = $1
              AND ($2::DATE IS NULL OR attendance_date >= $2)
              AND ($3::DATE IS NULL OR attendance_date <= $3)
            ORDER BY attendance_date ASC, id ASC
            "#
        ))
        .bind(member_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS} FROM attendance
            WHERE ($1::DATE IS NULL OR attendance_date >= $1)
              AND ($2::DATE IS NULL OR attendance_date <= $2)
              AND ($3::BIGINT IS NULL OR small_group_id = $3)
            ORDER BY attendance_date ASC, id ASC
            "#
        ))
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.small_group)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }
}
