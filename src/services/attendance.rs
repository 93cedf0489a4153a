//! Attendance ledger service
//!
//! One record per (date, member, group-or-none). Marking again overwrites the status.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::*;
use crate::utils::errors::{ChurchAdminError, Result};
use crate::utils::helpers::normalize_optional;

/// Result of a marking batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAttendanceResponse {
    pub message: String,
    pub saved: usize,
}

#[derive(Clone)]
pub struct AttendanceService {
    db: DatabaseService,
}

impl AttendanceService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Upsert each entry in order. A failing entry stops the batch; earlier entries stay saved.
    pub async fn mark(&self, request: MarkAttendanceRequest, actor_id: i64) -> Result<MarkAttendanceResponse> {
        if request.records.is_empty() {
            return Ok(MarkAttendanceResponse {
                message: "No records".to_string(),
                saved: 0,
            });
        }

        if let Some(group_id) = request.small_group {
            if self.db.groups.find_by_id(group_id).await?.is_none() {
                return Err(ChurchAdminError::not_found("Group", group_id));
            }
        }

        let mut saved = 0;
        for entry in request.records {
            if self.db.members.find_by_id(entry.member).await?.is_none() {
                return Err(ChurchAdminError::not_found("Member", entry.member));
            }
            let record = self
                .db
                .attendance
                .upsert(AttendanceMark {
                    date: request.date,
                    small_group_id: request.small_group,
                    member_id: entry.member,
                    status: entry.status.unwrap_or_default(),
                    notes: normalize_optional(entry.notes),
                })
                .await?;
            debug!(record_id = record.id, member_id = record.member_id, status = %record.status, "Attendance marked");
            saved += 1;
        }

        info!(
            date = %request.date,
            small_group = ?request.small_group,
            saved = saved,
            user_id = actor_id,
            "Attendance saved"
        );
        Ok(MarkAttendanceResponse {
            message: "Attendance saved".to_string(),
            saved,
        })
    }

    /// Records on a date, optionally for one group, with member and group names
    pub async fn by_date(&self, date: NaiveDate, small_group: Option<i64>) -> Result<Vec<AttendanceView>> {
        let records = self.db.attendance.find_by_date(date, small_group).await?;
        self.views(records).await
    }

    /// A member's records in date order within an inclusive range
    pub async fn by_member(&self, member_id: i64, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<AttendanceRecord>> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ChurchAdminError::validation("from must not be after to"));
            }
        }
        self.db.attendance.find_by_member(member_id, from, to).await
    }

    async fn views(&self, records: Vec<AttendanceRecord>) -> Result<Vec<AttendanceView>> {
        let member_ids: Vec<i64> = records.iter().map(|r| r.member_id).collect::<HashSet<_>>().into_iter().collect();
        let group_ids: Vec<i64> = records
            .iter()
            .filter_map(|r| r.small_group_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let members: HashMap<i64, MemberRef> = self
            .db
            .members
            .find_by_ids(&member_ids)
            .await?
            .iter()
            .map(|m| (m.id, MemberRef::from(m)))
            .collect();
        let groups: HashMap<i64, GroupRef> = self
            .db
            .groups
            .find_by_ids(&group_ids)
            .await?
            .iter()
            .map(|g| (g.id, GroupRef::from(g)))
            .collect();

        Ok(records
            .into_iter()
            .map(|record| AttendanceView {
                member: members.get(&record.member_id).cloned(),
                small_group: record.small_group_id.and_then(|id| groups.get(&id).cloned()),
                record,
            })
            .collect())
    }
}
