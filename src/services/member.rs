//! Member service implementation
//!
//! This service handles member records: validation, paginated listing, group
//! resolution for display, deletion with reference cleanup and bulk import.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::*;
use crate::services::export;
use crate::utils::errors::{ChurchAdminError, Result};
use crate::utils::helpers::{normalize_optional, normalize_patch, page_count};
use crate::utils::logging::{log_admin_action, log_member_action};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Highest page whose offset still fits in an i64
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Member service for record keeping
#[derive(Clone)]
pub struct MemberService {
    db: DatabaseService,
}

impl MemberService {
    /// Create a new MemberService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create(&self, request: CreateMemberRequest, actor_id: i64) -> Result<MemberView> {
        let request = normalize_create(request)?;
        let member = self.db.members.create(request).await?;
        log_member_action(member.id, "create", actor_id);
        self.view(member).await
    }

    /// Fetch a member with group and age resolved
    pub async fn get(&self, id: i64) -> Result<MemberView> {
        let member = self
            .db
            .members
            .find_by_id(id)
            .await?
            .ok_or_else(|| ChurchAdminError::not_found("Member", id))?;
        self.view(member).await
    }

    pub async fn list(&self, query: ListMembersQuery) -> Result<MemberPage> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = query.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let filter = MemberFilter {
            search: normalize_optional(query.search),
            gender: query.gender,
            ministry: normalize_optional(query.ministry),
            small_group_id: query.small_group,
        };
        debug!(page = page, limit = limit, filter = ?filter, "Listing members");

        let (members, total) = self.db.members.list(&filter, limit, (page - 1) * limit).await?;
        let items = self.views(members).await?;

        Ok(MemberPage {
            items,
            total,
            page,
            pages: page_count(total, limit),
        })
    }

    /// Partial update; group membership only changes through assign/remove
    pub async fn update(&self, id: i64, request: UpdateMemberRequest, actor_id: i64) -> Result<MemberView> {
        let mut request = request;
        if let Some(name) = request.full_name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ChurchAdminError::validation("fullName cannot be empty"));
            }
            request.full_name = Some(name);
        }
        request.phone = normalize_patch(request.phone);
        request.address = normalize_patch(request.address);
        request.ministry = normalize_patch(request.ministry);
        request.profile_photo_url = normalize_patch(request.profile_photo_url);

        let member = self
            .db
            .members
            .update(id, request)
            .await?
            .ok_or_else(|| ChurchAdminError::not_found("Member", id))?;
        log_member_action(member.id, "update", actor_id);
        self.view(member).await
    }

    /// Delete a member along with every reference to it
    pub async fn delete(&self, id: i64, actor_id: i64) -> Result<()> {
        if !self.db.members.delete(id).await? {
            return Err(ChurchAdminError::not_found("Member", id));
        }
        log_member_action(id, "delete", actor_id);
        Ok(())
    }

    /// Validate every row, then insert all of them as one batch
    pub async fn import(&self, request: ImportMembersRequest, actor_id: i64) -> Result<ImportSummary> {
        let rows = match (request.rows, request.csv) {
            (Some(rows), _) => rows,
            (None, Some(text)) => export::parse_member_rows(&text)?,
            (None, None) => return Err(ChurchAdminError::validation("rows must be an array or csv must be provided")),
        };

        let requests = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| row.into_request(i + 1))
            .collect::<Result<Vec<_>>>()?;

        let inserted = if requests.is_empty() {
            0
        } else {
            self.db.members.insert_many(requests).await?
        };

        log_admin_action(actor_id, "import_members", None, Some(&format!("{} rows", inserted)));
        info!(inserted = inserted, "Members imported");
        Ok(ImportSummary { inserted })
    }

    /// Every member with group names, for the CSV export
    pub async fn export_csv(&self) -> Result<export::CsvFile> {
        let members = self.db.members.list_all().await?;
        let group_names = self.group_names(&members).await?;
        Ok(export::CsvFile {
            filename: "members.csv",
            body: export::members_csv(&members, &group_names)?,
        })
    }

    async fn view(&self, member: Member) -> Result<MemberView> {
        let group = match member.small_group_id {
            Some(group_id) => self.db.groups.find_by_id(group_id).await?.map(|g| GroupRef::from(&g)),
            None => None,
        };
        Ok(MemberView::new(member, group, today()))
    }

    async fn views(&self, members: Vec<Member>) -> Result<Vec<MemberView>> {
        let group_names = self.group_names(&members).await?;
        let today = today();
        Ok(members
            .into_iter()
            .map(|member| {
                let group = member.small_group_id.and_then(|id| {
                    group_names.get(&id).map(|name| GroupRef { id, name: name.clone() })
                });
                MemberView::new(member, group, today)
            })
            .collect())
    }

    /// Names of the groups the members point at; dangling ids are simply absent
    async fn group_names(&self, members: &[Member]) -> Result<HashMap<i64, String>> {
        let ids: Vec<i64> = members
            .iter()
            .filter_map(|m| m.small_group_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let groups = self.db.groups.find_by_ids(&ids).await?;
        Ok(groups.into_iter().map(|g| (g.id, g.name)).collect())
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn normalize_create(request: CreateMemberRequest) -> Result<CreateMemberRequest> {
    let full_name = request.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(ChurchAdminError::validation("fullName is required"));
    }
    Ok(CreateMemberRequest {
        full_name,
        date_of_birth: request.date_of_birth,
        gender: request.gender,
        phone: normalize_optional(request.phone),
        address: normalize_optional(request.address),
        ministry: normalize_optional(request.ministry),
        profile_photo_url: normalize_optional(request.profile_photo_url),
    })
}
