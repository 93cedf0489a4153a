//! Report aggregations
//!
//! Pure functions over already-loaded records. Anything time-dependent takes an
//! explicit `now` so results are reproducible.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, Donation, DonationType, Event, Member, SmallGroup};
use crate::utils::helpers::year_month;

/// Age bucket boundaries; each bucket is `[bounds[i], bounds[i + 1])`
pub const AGE_BOUNDARIES: [u32; 6] = [0, 18, 30, 45, 60, 120];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeTotal {
    #[serde(rename = "type")]
    pub donation_type: DonationType,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTotal {
    pub date: NaiveDate,
    pub total: f64,
}

/// Present/total tally for one key. Only produced for keys with at least one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate<K> {
    pub key: K,
    pub present: u64,
    pub total: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBucket {
    pub min: u32,
    pub max: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBreakdown {
    pub buckets: Vec<AgeBucket>,
    /// Members without a birth date or with an age outside every bucket
    pub unknown: u64,
}

/// Count of members sharing a field value; `value: null` collects missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueCount<T> {
    pub value: Option<T>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSize {
    pub id: i64,
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCounts {
    pub upcoming: u64,
    pub past: u64,
    pub by_month: Vec<MonthCount>,
}

pub fn total_donations(donations: &[Donation]) -> f64 {
    donations.iter().map(|d| d.amount).sum()
}

/// Totals per (year, month) of the donation date, ascending
pub fn donations_by_month(donations: &[Donation]) -> Vec<MonthTotal> {
    let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for donation in donations {
        *totals.entry(year_month(donation.date)).or_default() += donation.amount;
    }
    totals
        .into_iter()
        .map(|((year, month), total)| MonthTotal { year, month, total })
        .collect()
}

pub fn donations_by_type(donations: &[Donation]) -> Vec<TypeTotal> {
    let mut totals: BTreeMap<DonationType, f64> = BTreeMap::new();
    for donation in donations {
        *totals.entry(donation.donation_type).or_default() += donation.amount;
    }
    totals
        .into_iter()
        .map(|(donation_type, total)| TypeTotal { donation_type, total })
        .collect()
}

/// Totals per date, largest first
pub fn donations_by_date(donations: &[Donation]) -> Vec<DateTotal> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for donation in donations {
        *totals.entry(donation.date).or_default() += donation.amount;
    }
    let mut by_date: Vec<DateTotal> = totals
        .into_iter()
        .map(|(date, total)| DateTotal { date, total })
        .collect();
    by_date.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.date.cmp(&b.date)));
    by_date
}

fn tally<K, F>(records: &[AttendanceRecord], key: F) -> Vec<Rate<K>>
where
    K: Ord,
    F: Fn(&AttendanceRecord) -> K,
{
    let mut counts: BTreeMap<K, (u64, u64)> = BTreeMap::new();
    for record in records {
        let entry = counts.entry(key(record)).or_default();
        if record.status.is_present() {
            entry.0 += 1;
        }
        entry.1 += 1;
    }
    counts
        .into_iter()
        .map(|(key, (present, total))| Rate {
            key,
            present,
            total,
            rate: present as f64 / total as f64,
        })
        .collect()
}

/// Attendance rate per date, ascending
pub fn attendance_by_date(records: &[AttendanceRecord]) -> Vec<Rate<NaiveDate>> {
    tally(records, |r| r.date)
}

/// Attendance rate per group; group-less records share the `null` key
pub fn attendance_by_group(records: &[AttendanceRecord]) -> Vec<Rate<Option<i64>>> {
    tally(records, |r| r.small_group_id)
}

pub fn attendance_by_member(records: &[AttendanceRecord]) -> Vec<Rate<i64>> {
    tally(records, |r| r.member_id)
}

/// Member counts per age bucket on `today`. Every bucket is listed, empty ones with 0.
pub fn age_buckets(members: &[Member], today: NaiveDate) -> AgeBreakdown {
    let mut buckets: Vec<AgeBucket> = AGE_BOUNDARIES
        .windows(2)
        .map(|w| AgeBucket { min: w[0], max: w[1], count: 0 })
        .collect();
    let mut unknown = 0;

    for member in members {
        let slot = member
            .age_on(today)
            .and_then(|age| buckets.iter_mut().find(|b| age >= b.min && age < b.max));
        match slot {
            Some(bucket) => bucket.count += 1,
            None => unknown += 1,
        }
    }

    AgeBreakdown { buckets, unknown }
}

/// Member counts grouped by the value `field` extracts, `None` first
pub fn distribution<T, F>(members: &[Member], field: F) -> Vec<ValueCount<T>>
where
    T: Ord,
    F: Fn(&Member) -> Option<T>,
{
    let mut counts: BTreeMap<Option<T>, u64> = BTreeMap::new();
    for member in members {
        *counts.entry(field(member)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect()
}

/// New members per (year, month) of creation
pub fn members_by_month(members: &[Member]) -> Vec<MonthCount> {
    month_histogram(members.iter().map(|m| m.created_at.date_naive()))
}

pub fn group_sizes(groups: &[SmallGroup]) -> Vec<GroupSize> {
    groups
        .iter()
        .map(|g| GroupSize {
            id: g.id,
            name: g.name.clone(),
            size: g.member_ids.len(),
        })
        .collect()
}

pub fn event_counts(events: &[Event], now: DateTime<Utc>) -> EventCounts {
    let upcoming = events.iter().filter(|e| e.is_upcoming(now)).count() as u64;
    EventCounts {
        upcoming,
        past: events.len() as u64 - upcoming,
        by_month: month_histogram(events.iter().map(|e| e.date.date_naive())),
    }
}

/// The next `limit` events at or after `now`, soonest first
pub fn upcoming_events(events: &[Event], now: DateTime<Utc>, limit: usize) -> Vec<Event> {
    let mut upcoming: Vec<Event> = events.iter().filter(|e| e.is_upcoming(now)).cloned().collect();
    upcoming.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    upcoming.truncate(limit);
    upcoming
}

fn month_histogram(dates: impl Iterator<Item = NaiveDate>) -> Vec<MonthCount> {
    let mut counts: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for date in dates {
        *counts.entry(year_month(date)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((year, month), count)| MonthCount { year, month, count })
        .collect()
}
