//! Donation service implementation

use tracing::info;

use crate::database::DatabaseService;
use crate::models::*;
use crate::services::export;
use crate::utils::errors::{ChurchAdminError, Result};
use crate::utils::helpers::normalize_optional;
use crate::utils::logging::log_admin_action;

#[derive(Clone)]
pub struct DonationService {
    db: DatabaseService,
}

impl DonationService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create(&self, request: CreateDonationRequest, actor_id: i64) -> Result<Donation> {
        validate_amount(request.amount)?;
        if let Some(member_id) = request.member_id {
            self.ensure_member(member_id).await?;
        }

        let donation = self
            .db
            .donations
            .create(CreateDonationRequest {
                donor_name: normalize_optional(request.donor_name),
                member_id: request.member_id,
                amount: request.amount,
                donation_type: request.donation_type,
                date: request.date,
                notes: normalize_optional(request.notes),
            })
            .await?;

        info!(donation_id = donation.id, amount = donation.amount, kind = %donation.donation_type, user_id = actor_id, "Donation recorded");
        Ok(donation)
    }

    /// Matching donations, newest first
    pub async fn list(&self, filter: DonationFilter) -> Result<Vec<Donation>> {
        validate_range(&filter)?;
        self.db.donations.list(&filter).await
    }

    pub async fn update(&self, id: i64, request: UpdateDonationRequest, actor_id: i64) -> Result<Donation> {
        if let Some(amount) = request.amount {
            validate_amount(amount)?;
        }
        if let Some(member_id) = request.member_id {
            self.ensure_member(member_id).await?;
        }

        let donation = self
            .db
            .donations
            .update(id, request)
            .await?
            .ok_or_else(|| ChurchAdminError::not_found("Donation", id))?;

        info!(donation_id = donation.id, user_id = actor_id, "Donation updated");
        Ok(donation)
    }

    pub async fn delete(&self, id: i64, actor_id: i64) -> Result<()> {
        if !self.db.donations.delete(id).await? {
            return Err(ChurchAdminError::not_found("Donation", id));
        }
        log_admin_action(actor_id, "delete_donation", Some(&id.to_string()), None);
        Ok(())
    }

    pub async fn export_csv(&self) -> Result<export::CsvFile> {
        let donations = self.db.donations.list(&DonationFilter::default()).await?;
        Ok(export::CsvFile {
            filename: "donations.csv",
            body: export::donations_csv(&donations)?,
        })
    }

    async fn ensure_member(&self, id: i64) -> Result<()> {
        match self.db.members.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ChurchAdminError::not_found("Member", id)),
        }
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ChurchAdminError::validation("amount must be a positive number"));
    }
    Ok(())
}

pub(crate) fn validate_range(filter: &DonationFilter) -> Result<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(ChurchAdminError::validation("from must not be after to"));
        }
    }
    Ok(())
}
