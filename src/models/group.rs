//! Small group model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::MemberRef;
use crate::utils::helpers::de_patch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmallGroup {
    pub id: i64,
    pub name: String,
    pub leader_id: Option<i64>,
    pub location: Option<String>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
    /// Member ids in insertion order, without duplicates
    pub member_ids: Vec<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SmallGroup {
    pub fn has_member(&self, member_id: i64) -> bool {
        self.member_ids.contains(&member_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRef {
    pub id: i64,
    pub name: String,
}

impl From<&SmallGroup> for GroupRef {
    fn from(group: &SmallGroup) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
        }
    }
}

/// A group with its leader and members resolved to references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: i64,
    pub name: String,
    pub leader: Option<MemberRef>,
    pub location: Option<String>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
    pub members: Vec<MemberRef>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "leader")]
    pub leader_id: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_day: Option<String>,
    #[serde(default)]
    pub meeting_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "leader", deserialize_with = "de_patch")]
    pub leader_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "de_patch")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "de_patch")]
    pub meeting_day: Option<Option<String>>,
    #[serde(default, deserialize_with = "de_patch")]
    pub meeting_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "de_patch")]
    pub notes: Option<Option<String>>,
}

/// Body of the assign/remove membership endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub member_id: i64,
}
