use super::event::Event;
use super::ids::GroupId;
use super::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Group {
            id: GroupId::new(),
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A resolved member of a group, as shown to callers.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct GroupMember {
    pub user: User,
    pub is_admin: bool,
}

impl GroupMember {
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// A group with its members and events. Each part is read separately, so a
/// concurrent change may show up in one part and not yet in another.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupDetails {
    pub group: Group,
    pub members: Vec<GroupMember>,
    pub events: Vec<Event>,
}

impl GroupDetails {
    pub fn admins(&self) -> impl Iterator<Item = &GroupMember> {
        self.members.iter().filter(|m| m.is_admin)
    }
}
