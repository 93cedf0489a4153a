//! Attendance model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::group::GroupRef;
use super::member::MemberRef;
use crate::utils::helpers::{de_date, de_opt_date};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, AttendanceStatus::Present)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            other => Err(format!("Invalid attendance status: {}", other)),
        }
    }
}

/// One stored attendance mark, unique per (date, member, group-or-none)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub member_id: i64,
    pub small_group_id: Option<i64>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attendance record with member and group resolved for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub member: Option<MemberRef>,
    pub small_group: Option<GroupRef>,
}

/// Upsert key and payload for a single mark
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceMark {
    pub date: NaiveDate,
    pub small_group_id: Option<i64>,
    pub member_id: i64,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub small_group: Option<i64>,
    pub records: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    #[serde(alias = "memberId")]
    pub member: i64,
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Date range and group filter shared by attendance queries and reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFilter {
    #[serde(default, deserialize_with = "de_opt_date")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub small_group: Option<i64>,
}

impl AttendanceFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        if self.from.is_some_and(|from| record.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| record.date > to) {
            return false;
        }
        if self.small_group.is_some() && self.small_group != record.small_group_id {
            return false;
        }
        true
    }
}
