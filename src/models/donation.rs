//! Donation model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::helpers::{de_date, de_opt_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationType {
    Tithe,
    Offering,
    Special,
}

impl DonationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationType::Tithe => "tithe",
            DonationType::Offering => "offering",
            DonationType::Special => "special",
        }
    }
}

impl fmt::Display for DonationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tithe" => Ok(DonationType::Tithe),
            "offering" => Ok(DonationType::Offering),
            "special" => Ok(DonationType::Special),
            other => Err(format!("Invalid donation type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: i64,
    pub donor_name: Option<String>,
    pub member_id: Option<i64>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub donation_type: DonationType,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    #[serde(default)]
    pub donor_name: Option<String>,
    #[serde(default, alias = "member")]
    pub member_id: Option<i64>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub donation_type: DonationType,
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDonationRequest {
    #[serde(default)]
    pub donor_name: Option<String>,
    #[serde(default, alias = "member")]
    pub member_id: Option<i64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, rename = "type")]
    pub donation_type: Option<DonationType>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Inclusive date range and type filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationFilter {
    #[serde(default, deserialize_with = "de_opt_date")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub to: Option<NaiveDate>,
    #[serde(default, rename = "type")]
    pub donation_type: Option<DonationType>,
}

impl DonationFilter {
    pub fn matches(&self, donation: &Donation) -> bool {
        if self.from.is_some_and(|from| donation.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| donation.date > to) {
            return false;
        }
        if self.donation_type.is_some_and(|t| t != donation.donation_type) {
            return false;
        }
        true
    }
}
