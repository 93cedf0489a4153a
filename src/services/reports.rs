//! Report service
//!
//! Loads the records each report needs and hands them to the aggregation functions.
//! Nothing here writes.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::database::DatabaseService;
use crate::models::*;
use crate::services::aggregation::{self, *};
use crate::services::donation::validate_range;
use crate::utils::errors::{ChurchAdminError, Result};
use crate::utils::helpers::de_opt_date;

pub const DASHBOARD_EVENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub total_members: i64,
    pub total_groups: i64,
    pub total_donations: f64,
    pub donations_by_month: Vec<MonthTotal>,
    pub upcoming_events: Vec<Event>,
    pub gender_stats: Vec<ValueCount<Gender>>,
    pub attendance_trend: Vec<Rate<NaiveDate>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberReport {
    pub members_by_month: Vec<MonthCount>,
    pub age_groups: AgeBreakdown,
    pub genders: Vec<ValueCount<Gender>>,
    pub by_ministry: Vec<ValueCount<String>>,
    pub by_group: Vec<ValueCount<i64>>,
}

/// Filters of the attendance report
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReportQuery {
    #[serde(default, deserialize_with = "de_opt_date")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub small_group: Option<i64>,
    /// Only records whose member belongs to this ministry
    #[serde(default)]
    pub ministry: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub daily: Vec<Rate<NaiveDate>>,
    pub by_group: Vec<Rate<Option<i64>>>,
    pub by_member: Vec<Rate<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationReport {
    pub total: f64,
    pub total_by_period: Vec<MonthTotal>,
    pub by_type: Vec<TypeTotal>,
    pub by_date: Vec<DateTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReport {
    pub group_sizes: Vec<GroupSize>,
    pub attendance_by_group: Vec<Rate<Option<i64>>>,
}

#[derive(Clone)]
pub struct ReportService {
    db: DatabaseService,
}

impl ReportService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardReport> {
        let donation_filter = DonationFilter::default();
        let attendance_filter = AttendanceFilter::default();
        let (donations, total_members, genders, events, attendance, total_groups) = futures::try_join!(
            self.db.donations.list(&donation_filter),
            self.db.members.count(),
            self.db.members.count_by_gender(),
            self.db.events.list(Some(now)),
            self.db.attendance.list(&attendance_filter),
            self.db.groups.count(),
        )?;

        let mut gender_stats: Vec<ValueCount<Gender>> = genders
            .into_iter()
            .map(|(gender, count)| ValueCount { value: Some(gender), count: count.max(0) as u64 })
            .collect();
        gender_stats.sort_by(|a, b| a.value.cmp(&b.value));

        Ok(DashboardReport {
            total_members,
            total_groups,
            total_donations: total_donations(&donations),
            donations_by_month: donations_by_month(&donations),
            upcoming_events: upcoming_events(&events, now, DASHBOARD_EVENT_LIMIT),
            gender_stats,
            attendance_trend: attendance_by_date(&attendance),
        })
    }

    pub async fn members(&self, now: DateTime<Utc>) -> Result<MemberReport> {
        let members = self.db.members.list_all().await?;

        Ok(MemberReport {
            members_by_month: members_by_month(&members),
            age_groups: age_buckets(&members, now.date_naive()),
            genders: distribution(&members, |m| Some(m.gender)),
            by_ministry: distribution(&members, |m| m.ministry.clone()),
            by_group: distribution(&members, |m| m.small_group_id),
        })
    }

    pub async fn attendance(&self, query: AttendanceReportQuery) -> Result<AttendanceReport> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(ChurchAdminError::validation("from must not be after to"));
            }
        }

        let filter = AttendanceFilter {
            from: query.from,
            to: query.to,
            small_group: query.small_group,
        };
        let mut records = self.db.attendance.list(&filter).await?;

        if let Some(ministry) = query.ministry.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            let in_ministry: HashSet<i64> = self
                .db
                .members
                .list_all()
                .await?
                .into_iter()
                .filter(|m| m.ministry.as_deref() == Some(ministry))
                .map(|m| m.id)
                .collect();
            records.retain(|r| in_ministry.contains(&r.member_id));
        }

        Ok(AttendanceReport {
            daily: attendance_by_date(&records),
            by_group: attendance_by_group(&records),
            by_member: attendance_by_member(&records),
        })
    }

    /// Donation breakdowns over an inclusive date range; an empty range totals 0
    pub async fn donations(&self, filter: DonationFilter) -> Result<DonationReport> {
        validate_range(&filter)?;
        let donations = self.db.donations.list(&filter).await?;

        Ok(DonationReport {
            total: total_donations(&donations),
            total_by_period: donations_by_month(&donations),
            by_type: donations_by_type(&donations),
            by_date: donations_by_date(&donations),
        })
    }

    pub async fn groups(&self) -> Result<GroupReport> {
        let filter = AttendanceFilter::default();
        let (groups, attendance) = futures::try_join!(self.db.groups.list(None), self.db.attendance.list(&filter))?;

        Ok(GroupReport {
            group_sizes: group_sizes(&groups),
            attendance_by_group: attendance_by_group(&attendance),
        })
    }

    pub async fn events(&self, now: DateTime<Utc>) -> Result<EventCounts> {
        let events = self.db.events.list(None).await?;
        Ok(aggregation::event_counts(&events, now))
    }
}
