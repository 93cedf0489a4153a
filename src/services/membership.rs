//! Small group membership service
//!
//! Owns the two-sided Member/Group link. Every change goes through a single
//! storage call that updates both sides together.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::database::DatabaseService;
use crate::models::*;
use crate::utils::errors::{ChurchAdminError, Result};
use crate::utils::helpers::{normalize_optional, normalize_patch};
use crate::utils::logging::log_group_event;

#[derive(Clone)]
pub struct MembershipService {
    db: DatabaseService,
}

impl MembershipService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create_group(&self, request: CreateGroupRequest, actor_id: i64) -> Result<GroupView> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ChurchAdminError::validation("name is required"));
        }
        if let Some(leader_id) = request.leader_id {
            self.ensure_member(leader_id).await?;
        }

        let group = self
            .db
            .groups
            .create(CreateGroupRequest {
                name,
                leader_id: request.leader_id,
                location: normalize_optional(request.location),
                meeting_day: normalize_optional(request.meeting_day),
                meeting_time: normalize_optional(request.meeting_time),
                notes: normalize_optional(request.notes),
            })
            .await?;

        log_group_event(group.id, "created", None, Some(&format!("by user {}", actor_id)));
        self.view(group).await
    }

    /// Groups by name with leader and members resolved
    pub async fn list_groups(&self, search: Option<String>) -> Result<Vec<GroupView>> {
        let search = normalize_optional(search);
        let groups = self.db.groups.list(search.as_deref()).await?;
        self.views(groups).await
    }

    pub async fn get_group(&self, id: i64) -> Result<GroupView> {
        let group = self.find_group(id).await?;
        self.view(group).await
    }

    /// Update descriptive fields; the member set is left alone
    pub async fn update_group(&self, id: i64, request: UpdateGroupRequest, actor_id: i64) -> Result<GroupView> {
        let mut request = request;
        if let Some(name) = request.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ChurchAdminError::validation("name cannot be empty"));
            }
            request.name = Some(name);
        }
        if let Some(Some(leader_id)) = request.leader_id {
            self.ensure_member(leader_id).await?;
        }
        request.location = normalize_patch(request.location);
        request.meeting_day = normalize_patch(request.meeting_day);
        request.meeting_time = normalize_patch(request.meeting_time);
        request.notes = normalize_patch(request.notes);

        let group = self
            .db
            .groups
            .update(id, request)
            .await?
            .ok_or_else(|| ChurchAdminError::not_found("Group", id))?;

        log_group_event(group.id, "updated", None, Some(&format!("by user {}", actor_id)));
        self.view(group).await
    }

    /// Put the member in the group, moving it out of any previous group
    pub async fn assign(&self, group_id: i64, member_id: i64, actor_id: i64) -> Result<GroupView> {
        let outcome = self
            .db
            .groups
            .assign_member(group_id, member_id)
            .await?
            .ok_or_else(|| ChurchAdminError::not_found("Group", group_id))?;

        if !outcome.member_found {
            warn!(group_id = group_id, member_id = member_id, "Assigned a member id with no member record");
        }
        if let Some(previous) = outcome.previous_group_id.filter(|p| *p != group_id) {
            info!(member_id = member_id, from_group = previous, to_group = group_id, "Member moved between groups");
        }
        log_group_event(group_id, "member_assigned", Some(member_id), Some(&format!("by user {}", actor_id)));

        self.view(outcome.group).await
    }

    /// Take the member out of the group and clear its group field. Idempotent.
    pub async fn remove(&self, group_id: i64, member_id: i64, actor_id: i64) -> Result<GroupView> {
        let group = self
            .db
            .groups
            .remove_member(group_id, member_id)
            .await?
            .ok_or_else(|| ChurchAdminError::not_found("Group", group_id))?;

        log_group_event(group_id, "member_removed", Some(member_id), Some(&format!("by user {}", actor_id)));
        self.view(group).await
    }

    /// Unassign every member of the group, then delete it
    pub async fn delete_group(&self, group_id: i64, actor_id: i64) -> Result<u64> {
        let unassigned = self
            .db
            .groups
            .delete_cascade(group_id)
            .await?
            .ok_or_else(|| ChurchAdminError::not_found("Group", group_id))?;

        log_group_event(
            group_id,
            "deleted",
            None,
            Some(&format!("by user {}, {} members unassigned", actor_id, unassigned)),
        );
        Ok(unassigned)
    }

    async fn find_group(&self, id: i64) -> Result<SmallGroup> {
        self.db
            .groups
            .find_by_id(id)
            .await?
            .ok_or_else(|| ChurchAdminError::not_found("Group", id))
    }

    async fn ensure_member(&self, id: i64) -> Result<()> {
        match self.db.members.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ChurchAdminError::not_found("Member", id)),
        }
    }

    async fn view(&self, group: SmallGroup) -> Result<GroupView> {
        let mut views = self.views(vec![group]).await?;
        views
            .pop()
            .ok_or_else(|| ChurchAdminError::Internal("group view missing".to_string()))
    }

    /// Resolve leaders and members with one lookup; ids with no member record are skipped
    async fn views(&self, groups: Vec<SmallGroup>) -> Result<Vec<GroupView>> {
        let ids: Vec<i64> = groups
            .iter()
            .flat_map(|g| g.member_ids.iter().copied().chain(g.leader_id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let members: HashMap<i64, MemberRef> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.db
                .members
                .find_by_ids(&ids)
                .await?
                .iter()
                .map(|m| (m.id, MemberRef::from(m)))
                .collect()
        };

        Ok(groups
            .into_iter()
            .map(|group| GroupView {
                id: group.id,
                name: group.name,
                leader: group.leader_id.and_then(|id| members.get(&id).cloned()),
                location: group.location,
                meeting_day: group.meeting_day,
                meeting_time: group.meeting_time,
                members: group
                    .member_ids
                    .iter()
                    .filter_map(|id| members.get(id).cloned())
                    .collect(),
                notes: group.notes,
                created_at: group.created_at,
                updated_at: group.updated_at,
            })
            .collect())
    }
}
