//! Storage ports
//!
//! Services talk to storage through these traits. They are implemented by the
//! PostgreSQL repositories and by the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::models::*;
use crate::utils::errors::Result;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn count_by_role(&self, role: Role) -> Result<i64>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn create(&self, request: CreateMemberRequest) -> Result<Member>;

    /// Insert all rows as one batch; either every row is stored or none
    async fn insert_many(&self, requests: Vec<CreateMemberRequest>) -> Result<u64>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Member>>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Member>>;

    /// One page of matching members, newest first, plus the total match count
    async fn list(&self, filter: &MemberFilter, limit: i64, offset: i64) -> Result<(Vec<Member>, i64)>;

    async fn list_all(&self) -> Result<Vec<Member>>;

    async fn count(&self) -> Result<i64>;

    /// Member count per gender; genders with no members are omitted
    async fn count_by_gender(&self) -> Result<Vec<(Gender, i64)>>;

    async fn update(&self, id: i64, request: UpdateMemberRequest) -> Result<Option<Member>>;

    /// Delete a member and every reference to it. Returns false if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Small group storage, including the two-sided membership updates
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn create(&self, request: CreateGroupRequest) -> Result<SmallGroup>;

    async fn find_by_id(&self, id: i64) -> Result<Option<SmallGroup>>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<SmallGroup>>;

    /// Groups whose name contains `search` (case-insensitive), by name
    async fn list(&self, search: Option<&str>) -> Result<Vec<SmallGroup>>;

    async fn count(&self) -> Result<i64>;

    async fn update(&self, id: i64, request: UpdateGroupRequest) -> Result<Option<SmallGroup>>;

    /// Add the member to the group's set, pull it from any previous group's set
    /// and point the member at the group, as one unit.
    /// Returns `None` when the group does not exist.
    async fn assign_member(&self, group_id: i64, member_id: i64) -> Result<Option<AssignOutcome>>;

    /// Pull the member from the group's set and clear the member's group field, as one unit.
    /// Returns `None` when the group does not exist.
    async fn remove_member(&self, group_id: i64, member_id: i64) -> Result<Option<SmallGroup>>;

    /// Unset the group on all of its members, then delete it, as one unit.
    /// Returns the number of members unassigned, `None` when the group does not exist.
    async fn delete_cascade(&self, group_id: i64) -> Result<Option<u64>>;
}

/// Result of an assignment
#[derive(Debug, Clone)]
pub struct AssignOutcome {
    pub group: SmallGroup,
    /// False when no member row carried the id
    pub member_found: bool,
    pub previous_group_id: Option<i64>,
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Insert or overwrite the record keyed by (date, group, member)
    async fn upsert(&self, mark: AttendanceMark) -> Result<AttendanceRecord>;

    async fn find_by_date(&self, date: NaiveDate, small_group_id: Option<i64>) -> Result<Vec<AttendanceRecord>>;

    /// A member's records ordered by date ascending within an inclusive range
    async fn find_by_member(&self, member_id: i64, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<AttendanceRecord>>;

    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>>;
}

#[async_trait]
pub trait DonationStore: Send + Sync {
    async fn create(&self, request: CreateDonationRequest) -> Result<Donation>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Donation>>;

    /// Matching donations, newest first
    async fn list(&self, filter: &DonationFilter) -> Result<Vec<Donation>>;

    async fn update(&self, id: i64, request: UpdateDonationRequest) -> Result<Option<Donation>>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create(&self, request: CreateEventRequest) -> Result<Event>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>>;

    /// Events ordered by date ascending, optionally only those at or after `since`
    async fn list(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Event>>;

    async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Option<Event>>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Backend liveness probe used by the health endpoint
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> Result<()>;
}
