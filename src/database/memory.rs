//! In-memory storage backend
//!
//! Selected with `database.url = "memory://"` and used by the test suite.
//! All tables sit behind one lock, so every trait method is applied atomically,
//! matching the per-operation transactions of the PostgreSQL repositories.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::database::store::*;
use crate::models::*;
use crate::utils::errors::{ChurchAdminError, Result};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    members: BTreeMap<i64, Member>,
    groups: BTreeMap<i64, SmallGroup>,
    attendance: BTreeMap<i64, AttendanceRecord>,
    donations: BTreeMap<i64, Donation>,
    events: BTreeMap<i64, Event>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_member(&mut self, request: CreateMemberRequest, now: DateTime<Utc>) -> Member {
        let member = Member {
            id: self.next_id(),
            full_name: request.full_name,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            phone: request.phone,
            address: request.address,
            ministry: request.ministry,
            small_group_id: None,
            profile_photo_url: request.profile_photo_url,
            created_at: now,
            updated_at: now,
        };
        self.members.insert(member.id, member.clone());
        member
    }
}

/// Process-local store implementing every storage port
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a member's group field without touching any group.
    /// Reproduces the state left behind by an interrupted two-step update.
    pub async fn write_member_group_raw(&self, member_id: i64, group_id: Option<i64>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let member = tables
            .members
            .get_mut(&member_id)
            .ok_or_else(|| ChurchAdminError::not_found("Member", member_id))?;
        member.small_group_id = group_id;
        Ok(())
    }

    /// Delete a group row alone, leaving member references in place
    pub async fn delete_group_raw(&self, group_id: i64) -> bool {
        self.tables.write().await.groups.remove(&group_id).is_some()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let mut tables = self.tables.write().await;
        let email = request.email.trim().to_lowercase();
        if tables.users.values().any(|u| u.email == email) {
            return Err(ChurchAdminError::validation(format!("Email already registered: {}", email)));
        }
        let now = Utc::now();
        let user = User {
            id: tables.next_id(),
            name: request.name,
            email,
            password_hash: request.password_hash,
            role: request.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self.tables.read().await.users.values().find(|u| u.email == email).cloned())
    }

    async fn count_by_role(&self, role: Role) -> Result<i64> {
        Ok(self.tables.read().await.users.values().filter(|u| u.role == role).count() as i64)
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn create(&self, request: CreateMemberRequest) -> Result<Member> {
        Ok(self.tables.write().await.insert_member(request, Utc::now()))
    }

    async fn insert_many(&self, requests: Vec<CreateMemberRequest>) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut inserted = 0u64;
        for request in requests {
            tables.insert_member(request, now);
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Member>> {
        Ok(self.tables.read().await.members.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Member>> {
        let tables = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| tables.members.get(id).cloned()).collect())
    }

    async fn list(&self, filter: &MemberFilter, limit: i64, offset: i64) -> Result<(Vec<Member>, i64)> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Member> = tables.members.values().filter(|m| filter.matches(m)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn list_all(&self) -> Result<Vec<Member>> {
        let tables = self.tables.read().await;
        let mut members: Vec<Member> = tables.members.values().cloned().collect();
        members.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(members)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.tables.read().await.members.len() as i64)
    }

    async fn count_by_gender(&self) -> Result<Vec<(Gender, i64)>> {
        let tables = self.tables.read().await;
        let mut counts: BTreeMap<Gender, i64> = BTreeMap::new();
        for member in tables.members.values() {
            *counts.entry(member.gender).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn update(&self, id: i64, request: UpdateMemberRequest) -> Result<Option<Member>> {
        let mut tables = self.tables.write().await;
        let Some(member) = tables.members.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(full_name) = request.full_name {
            member.full_name = full_name;
        }
        if let Some(date_of_birth) = request.date_of_birth {
            member.date_of_birth = date_of_birth;
        }
        if let Some(gender) = request.gender {
            member.gender = gender;
        }
        if let Some(phone) = request.phone {
            member.phone = phone;
        }
        if let Some(address) = request.address {
            member.address = address;
        }
        if let Some(ministry) = request.ministry {
            member.ministry = ministry;
        }
        if let Some(profile_photo_url) = request.profile_photo_url {
            member.profile_photo_url = profile_photo_url;
        }
        member.updated_at = Utc::now();
        Ok(Some(member.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.members.remove(&id).is_none() {
            return Ok(false);
        }
        for group in tables.groups.values_mut() {
            group.member_ids.retain(|m| *m != id);
            if group.leader_id == Some(id) {
                group.leader_id = None;
            }
        }
        for event in tables.events.values_mut() {
            event.attendees.retain(|m| *m != id);
        }
        for donation in tables.donations.values_mut() {
            if donation.member_id == Some(id) {
                donation.member_id = None;
            }
        }
        tables.attendance.retain(|_, record| record.member_id != id);
        Ok(true)
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn create(&self, request: CreateGroupRequest) -> Result<SmallGroup> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let group = SmallGroup {
            id: tables.next_id(),
            name: request.name,
            leader_id: request.leader_id,
            location: request.location,
            meeting_day: request.meeting_day,
            meeting_time: request.meeting_time,
            member_ids: Vec::new(),
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<SmallGroup>> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<SmallGroup>> {
        let tables = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| tables.groups.get(id).cloned()).collect())
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<SmallGroup>> {
        let tables = self.tables.read().await;
        let needle = search.map(str::to_lowercase);
        let mut groups: Vec<SmallGroup> = tables
            .groups
            .values()
            .filter(|g| {
                needle
                    .as_deref()
                    .map(|n| g.name.to_lowercase().contains(n))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.tables.read().await.groups.len() as i64)
    }

    async fn update(&self, id: i64, request: UpdateGroupRequest) -> Result<Option<SmallGroup>> {
        let mut tables = self.tables.write().await;
        let Some(group) = tables.groups.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = request.name {
            group.name = name;
        }
        if let Some(leader_id) = request.leader_id {
            group.leader_id = leader_id;
        }
        if let Some(location) = request.location {
            group.location = location;
        }
        if let Some(meeting_day) = request.meeting_day {
            group.meeting_day = meeting_day;
        }
        if let Some(meeting_time) = request.meeting_time {
            group.meeting_time = meeting_time;
        }
        if let Some(notes) = request.notes {
            group.notes = notes;
        }
        group.updated_at = Utc::now();
        Ok(Some(group.clone()))
    }

    async fn assign_member(&self, group_id: i64, member_id: i64) -> Result<Option<AssignOutcome>> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&group_id) {
            return Ok(None);
        }
        let now = Utc::now();

        for (id, group) in tables.groups.iter_mut() {
            if *id != group_id && group.has_member(member_id) {
                group.member_ids.retain(|m| *m != member_id);
                group.updated_at = now;
            }
        }

        let (member_found, previous_group_id) = match tables.members.get_mut(&member_id) {
            Some(member) => {
                let previous = member.small_group_id.replace(group_id);
                member.updated_at = now;
                (true, previous)
            }
            None => (false, None),
        };

        let Some(group) = tables.groups.get_mut(&group_id) else {
            return Ok(None);
        };
        if !group.has_member(member_id) {
            group.member_ids.push(member_id);
        }
        group.updated_at = now;

        Ok(Some(AssignOutcome {
            group: group.clone(),
            member_found,
            previous_group_id,
        }))
    }

    async fn remove_member(&self, group_id: i64, member_id: i64) -> Result<Option<SmallGroup>> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let group = match tables.groups.get_mut(&group_id) {
            Some(group) => {
                group.member_ids.retain(|m| *m != member_id);
                group.updated_at = now;
                group.clone()
            }
            None => return Ok(None),
        };
        if let Some(member) = tables.members.get_mut(&member_id) {
            member.small_group_id = None;
            member.updated_at = now;
        }
        Ok(Some(group))
    }

    async fn delete_cascade(&self, group_id: i64) -> Result<Option<u64>> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&group_id) {
            return Ok(None);
        }
        let now = Utc::now();
        let mut unassigned = 0u64;
        for member in tables.members.values_mut() {
            if member.small_group_id == Some(group_id) {
                member.small_group_id = None;
                member.updated_at = now;
                unassigned += 1;
            }
        }
        tables.groups.remove(&group_id);
        Ok(Some(unassigned))
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn upsert(&self, mark: AttendanceMark) -> Result<AttendanceRecord> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let existing = tables.attendance.values_mut().find(|r| {
            r.date == mark.date && r.member_id == mark.member_id && r.small_group_id == mark.small_group_id
        });

        if let Some(record) = existing {
            record.status = mark.status;
            if mark.notes.is_some() {
                record.notes = mark.notes;
            }
            record.updated_at = now;
            return Ok(record.clone());
        }

        let record = AttendanceRecord {
            id: tables.next_id(),
            date: mark.date,
            member_id: mark.member_id,
            small_group_id: mark.small_group_id,
            status: mark.status,
            notes: mark.notes,
            created_at: now,
            updated_at: now,
        };
        tables.attendance.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_date(&self, date: NaiveDate, small_group_id: Option<i64>) -> Result<Vec<AttendanceRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendance
            .values()
            .filter(|r| r.date == date)
            .filter(|r| small_group_id.is_none() || r.small_group_id == small_group_id)
            .cloned()
            .collect())
    }

    async fn find_by_member(&self, member_id: i64, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<AttendanceRecord>> {
        let tables = self.tables.read().await;
        let filter = AttendanceFilter { from, to, small_group: None };
        let mut records: Vec<AttendanceRecord> = tables
            .attendance
            .values()
            .filter(|r| r.member_id == member_id && filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<AttendanceRecord> = tables
            .attendance
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}

#[async_trait]
impl DonationStore for MemoryStore {
    async fn create(&self, request: CreateDonationRequest) -> Result<Donation> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let donation = Donation {
            id: tables.next_id(),
            donor_name: request.donor_name,
            member_id: request.member_id,
            amount: request.amount,
            donation_type: request.donation_type,
            date: request.date,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };
        tables.donations.insert(donation.id, donation.clone());
        Ok(donation)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Donation>> {
        Ok(self.tables.read().await.donations.get(&id).cloned())
    }

    async fn list(&self, filter: &DonationFilter) -> Result<Vec<Donation>> {
        let tables = self.tables.read().await;
        let mut donations: Vec<Donation> = tables
            .donations
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        donations.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(donations)
    }

    async fn update(&self, id: i64, request: UpdateDonationRequest) -> Result<Option<Donation>> {
        let mut tables = self.tables.write().await;
        let Some(donation) = tables.donations.get_mut(&id) else {
            return Ok(None);
        };
        if request.donor_name.is_some() {
            donation.donor_name = request.donor_name;
        }
        if request.member_id.is_some() {
            donation.member_id = request.member_id;
        }
        if let Some(amount) = request.amount {
            donation.amount = amount;
        }
        if let Some(donation_type) = request.donation_type {
            donation.donation_type = donation_type;
        }
        if let Some(date) = request.date {
            donation.date = date;
        }
        if request.notes.is_some() {
            donation.notes = request.notes;
        }
        donation.updated_at = Utc::now();
        Ok(Some(donation.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().await.donations.remove(&id).is_some())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let event = Event {
            id: tables.next_id(),
            title: request.title,
            description: request.description,
            date: request.date,
            time: request.time,
            location: request.location,
            attendees: request.attendees,
            created_at: now,
            updated_at: now,
        };
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn list(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| since.map(|s| e.date >= s).unwrap_or(true))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Option<Event>> {
        let mut tables = self.tables.write().await;
        let Some(event) = tables.events.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = request.title {
            event.title = title;
        }
        if request.description.is_some() {
            event.description = request.description;
        }
        if let Some(date) = request.date {
            event.date = date;
        }
        if request.time.is_some() {
            event.time = request.time;
        }
        if request.location.is_some() {
            event.location = request.location;
        }
        if let Some(attendees) = request.attendees {
            event.attendees = attendees;
        }
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().await.events.remove(&id).is_some())
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
