//! CSV export and import parsing
//!
//! Uses the `csv` crate with `QuoteStyle::Necessary`: fields containing a comma,
//! quote or newline are quoted with inner quotes doubled.

use std::collections::HashMap;

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};

use crate::models::{Donation, Member, MemberImportRow};
use crate::utils::errors::{ChurchAdminError, Result};

pub const MEMBER_HEADERS: [&str; 8] = [
    "Full Name",
    "Gender",
    "Phone",
    "Address",
    "Ministry",
    "Small Group",
    "Profile Photo URL",
    "Created At",
];

pub const DONATION_HEADERS: [&str; 4] = ["Donor Name", "Amount", "Type", "Date"];

/// A rendered CSV attachment
#[derive(Debug, Clone)]
pub struct CsvFile {
    pub filename: &'static str,
    pub body: String,
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ChurchAdminError::Internal(format!("CSV buffer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ChurchAdminError::Internal(format!("CSV encoding error: {}", e)))
}

/// Members export; `group_names` maps group ids to names, missing ids render empty
pub fn members_csv(members: &[Member], group_names: &HashMap<i64, String>) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(MEMBER_HEADERS)?;
    for member in members {
        let group = member
            .small_group_id
            .and_then(|id| group_names.get(&id))
            .map(String::as_str)
            .unwrap_or("");
        let created_at = member.created_at.to_rfc3339();
        writer.write_record([
            member.full_name.as_str(),
            member.gender.as_str(),
            opt(&member.phone),
            opt(&member.address),
            opt(&member.ministry),
            group,
            opt(&member.profile_photo_url),
            created_at.as_str(),
        ])?;
    }
    writer.flush()?;

    finish(writer)
}

pub fn donations_csv(donations: &[Donation]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(DONATION_HEADERS)?;
    for donation in donations {
        let amount = donation.amount.to_string();
        let date = donation.date.to_string();
        writer.write_record([
            opt(&donation.donor_name),
            amount.as_str(),
            donation.donation_type.as_str(),
            date.as_str(),
        ])?;
    }
    writer.flush()?;

    finish(writer)
}

/// Parse CSV text with a header row into import rows.
/// Headers may be the export column names or camelCase field names.
pub fn parse_member_rows(text: &str) -> Result<Vec<MemberImportRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .deserialize::<MemberImportRow>()
        .enumerate()
        .map(|(i, row)| row.map_err(|e| ChurchAdminError::validation(format!("Row {}: {}", i + 1, e))))
        .collect()
}
