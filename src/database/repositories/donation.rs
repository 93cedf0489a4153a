//! Donation repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::store::DonationStore;
use crate::models::donation::{CreateDonationRequest, Donation, DonationFilter, UpdateDonationRequest};
use crate::utils::errors::{ChurchAdminError, Result};

const DONATION_COLUMNS: &str = "id, donor_name, member_id, amount, donation_type, donation_date, notes, created_at, updated_at";

#[derive(FromRow)]
struct DonationRow {
    id: i64,
    donor_name: Option<String>,
    member_id: Option<i64>,
    amount: f64,
    donation_type: String,
    donation_date: NaiveDate,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DonationRow> for Donation {
    type Error = ChurchAdminError;

    fn try_from(row: DonationRow) -> Result<Self> {
        Ok(Donation {
            id: row.id,
            donor_name: row.donor_name,
            member_id: row.member_id,
            amount: row.amount,
            donation_type: row.donation_type.parse().map_err(ChurchAdminError::Internal)?,
            date: row.donation_date,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct DonationRepository {
    pool: PgPool,
}

impl DonationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DonationStore for DonationRepository {
    async fn create(&self, request: CreateDonationRequest) -> Result<Donation> {
        let row = sqlx::query_as::<_, DonationRow>(&format!(
            r#"
            INSERT INTO donations (donor_name, member_id, amount, donation_type, donation_date, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {DONATION_COLUMNS}
            "#
        ))
        .bind(request.donor_name)
        .bind(request.member_id)
        .bind(request.amount)
        .bind(request.donation_type.as_str())
        .bind(request.date)
        .bind(request.notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Donation>> {
        let row = sqlx::query_as::<_, DonationRow>(&format!("SELECT {DONATION_COLUMNS} FROM donations WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Donation::try_from).transpose()
    }

    async fn list(&self, filter: &DonationFilter) -> Result<Vec<Donation>> {
        let rows = sqlx::query_as::<_, DonationRow>(&format!(
            r#"
            SELECT {DONATION_COLUMNS} FROM donations
            WHERE ($1::DATE IS NULL OR donation_date >= $1)
              AND ($2::DATE IS NULL OR donation_date <= $2)
              AND ($3::TEXT IS NULL OR donation_type = $3)
            ORDER BY donation_date DESC, id DESC
            "#
        ))
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.donation_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Donation::try_from).collect()
    }

    async fn update(&self, id: i64, request: UpdateDonationRequest) -> Result<Option<Donation>> {
        let row = sqlx::query_as::<_, DonationRow>(&format!(
            r#"
            UPDATE donations
            SET donor_name = COALESCE($2, donor_name),
                member_id = COALESCE($3, member_id),
                amount = COALESCE($4, amount),
                donation_type = COALESCE($5, donation_type),
                donation_date = COALESCE($6, donation_date),
                notes = COALESCE($7, notes),
                updated_at = $8
            WHERE id = $1
            RETURNING {DONATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.donor_name)
        .bind(request.member_id)
        .bind(request.amount)
        .bind(request.donation_type.map(|t| t.as_str()))
        .bind(request.date)
        .bind(request.notes)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Donation::try_from).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM donations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}
