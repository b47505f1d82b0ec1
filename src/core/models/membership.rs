use super::ids::{GroupId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// "User belongs to Group", keyed by `(group_id, user_id)`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Membership {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(group_id: GroupId, user_id: UserId, is_admin: bool) -> Self {
        Membership {
            group_id,
            user_id,
            is_admin,
            joined_at: Utc::now(),
        }
    }

    pub fn key(&self) -> (GroupId, UserId) {
        (self.group_id, self.user_id.clone())
    }
}

/// Membership status of one user in one group.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MembershipStatus {
    pub is_member: bool,
    pub is_admin: bool,
}
