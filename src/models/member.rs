//! Member model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::group::GroupRef;
use crate::utils::errors::{ChurchAdminError, Result};
use crate::utils::helpers::{age_on, de_opt_date, de_patch, de_patch_date, normalize_optional, parse_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("Invalid gender: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub ministry: Option<String>,
    pub small_group_id: Option<i64>,
    pub profile_photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Age in whole years on `today`, `None` without a birth date
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|dob| age_on(dob, today))
    }
}

/// Lightweight reference used when a member is embedded in another record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub id: i64,
    pub full_name: String,
}

impl From<&Member> for MemberRef {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            full_name: member.full_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub ministry: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Partial member update. For clearable fields the outer `None` leaves the
/// column alone and `Some(None)` clears it.
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "de_patch_date")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "de_patch")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "de_patch")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "de_patch")]
    pub ministry: Option<Option<String>>,
    #[serde(default, deserialize_with = "de_patch")]
    pub profile_photo_url: Option<Option<String>>,
}

/// Filters accepted by the member listing
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    /// Case-insensitive substring of full name or phone
    pub search: Option<String>,
    pub gender: Option<Gender>,
    pub ministry: Option<String>,
    pub small_group_id: Option<i64>,
}

impl MemberFilter {
    pub fn matches(&self, member: &Member) -> bool {
        if let Some(search) = self.search.as_deref() {
            let needle = search.to_lowercase();
            let in_name = member.full_name.to_lowercase().contains(&needle);
            let in_phone = member
                .phone
                .as_deref()
                .map(|p| p.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_name && !in_phone {
                return false;
            }
        }
        if self.gender.is_some_and(|g| g != member.gender) {
            return false;
        }
        if let Some(ministry) = self.ministry.as_deref() {
            if member.ministry.as_deref() != Some(ministry) {
                return false;
            }
        }
        if self.small_group_id.is_some() && self.small_group_id != member.small_group_id {
            return false;
        }
        true
    }
}

/// Member as returned by the API, with the group resolved and the age derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: i64,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub ministry: Option<String>,
    /// `None` when unassigned or when the stored group no longer exists
    pub small_group: Option<GroupRef>,
    pub profile_photo_url: Option<String>,
    pub age: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberView {
    pub fn new(member: Member, small_group: Option<GroupRef>, today: NaiveDate) -> Self {
        let age = member.age_on(today);
        Self {
            id: member.id,
            full_name: member.full_name,
            date_of_birth: member.date_of_birth,
            gender: member.gender,
            phone: member.phone,
            address: member.address,
            ministry: member.ministry,
            small_group,
            profile_photo_url: member.profile_photo_url,
            age,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

/// One page of the member listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberPage {
    pub items: Vec<MemberView>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

/// Query string of the member listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembersQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub ministry: Option<String>,
    #[serde(default)]
    pub small_group: Option<i64>,
}

/// Untyped import row, accepted from JSON (camelCase keys) or CSV (export headers)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberImportRow {
    #[serde(default, alias = "Full Name")]
    pub full_name: Option<String>,
    #[serde(default, alias = "Gender")]
    pub gender: Option<String>,
    #[serde(default, alias = "Date of Birth")]
    pub date_of_birth: Option<String>,
    #[serde(default, alias = "Phone")]
    pub phone: Option<String>,
    #[serde(default, alias = "Address")]
    pub address: Option<String>,
    #[serde(default, alias = "Ministry")]
    pub ministry: Option<String>,
    #[serde(default, alias = "Profile Photo URL")]
    pub profile_photo_url: Option<String>,
}

impl MemberImportRow {
    /// Validate the row; `row` is the 1-based position used in error messages
    pub fn into_request(self, row: usize) -> Result<CreateMemberRequest> {
        let full_name = normalize_optional(self.full_name)
            .ok_or_else(|| ChurchAdminError::validation(format!("Row {}: fullName is required", row)))?;
        let gender = normalize_optional(self.gender)
            .ok_or_else(|| ChurchAdminError::validation(format!("Row {}: gender is required", row)))?
            .parse::<Gender>()
            .map_err(|e| ChurchAdminError::validation(format!("Row {}: {}", row, e)))?;
        let date_of_birth = normalize_optional(self.date_of_birth)
            .map(|raw| parse_date(&raw))
            .transpose()
            .map_err(|e| ChurchAdminError::validation(format!("Row {}: {}", row, e)))?;

        Ok(CreateMemberRequest {
            full_name,
            date_of_birth,
            gender,
            phone: normalize_optional(self.phone),
            address: normalize_optional(self.address),
            ministry: normalize_optional(self.ministry),
            profile_photo_url: normalize_optional(self.profile_photo_url),
        })
    }
}

/// Body of the import endpoint: structured rows or raw CSV text
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportMembersRequest {
    #[serde(default)]
    pub rows: Option<Vec<MemberImportRow>>,
    #[serde(default)]
    pub csv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub inserted: u64,
}
