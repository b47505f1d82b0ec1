use crate::core::errors::GifterError;
use crate::core::models::{Event, EventId, Group, GroupId, Membership, UserId};
use async_trait::async_trait;

/// Selects memberships for scans and counts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MembershipFilter {
    pub group_id: Option<GroupId>,
    pub user_id: Option<UserId>,
    pub admins_only: bool,
}

impl MembershipFilter {
    pub fn group(group_id: GroupId) -> Self {
        MembershipFilter {
            group_id: Some(group_id),
            ..Default::default()
        }
    }

    pub fn user(user_id: UserId) -> Self {
        MembershipFilter {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn admins(mut self) -> Self {
        self.admins_only = true;
        self
    }

    pub fn matches(&self, membership: &Membership) -> bool {
        self.group_id.is_none_or(|g| g == membership.group_id)
            && self.user_id.as_ref().is_none_or(|u| *u == membership.user_id)
            && (!self.admins_only || membership.is_admin)
    }
}

/// Precondition re-checked by the gateway when a commit is applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Guard {
    GroupExists(GroupId),
    EventExists(EventId),
    MembershipAbsent { group_id: GroupId, user_id: UserId },
    /// The membership exists and still carries this admin flag.
    MembershipPresent {
        group_id: GroupId,
        user_id: UserId,
        is_admin: bool,
    },
    MembersAtLeast { filter: MembershipFilter, min: usize },
    MembersAtMost { filter: MembershipFilter, max: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Write {
    PutGroup(Group),
    /// Cascades to the group's memberships and events.
    DeleteGroup(GroupId),
    PutMembership(Membership),
    DeleteMembership { group_id: GroupId, user_id: UserId },
    /// Every membership of the user, across all groups.
    DeleteUserMemberships(UserId),
    PutEvent(Event),
    DeleteEvent(EventId),
}

/// A unit of work: every guard holds and every write applies, or nothing changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    guards: Vec<Guard>,
    writes: Vec<Write>,
}

impl Commit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn write(mut self, write: Write) -> Self {
        self.writes.push(write);
        self
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_group(&self, group_id: GroupId) -> Result<Option<Group>, GifterError>;
    async fn list_groups(&self, group_ids: &[GroupId]) -> Result<Vec<Group>, GifterError>;
    async fn get_membership(&self, group_id: GroupId, user_id: &UserId) -> Result<Option<Membership>, GifterError>;
    /// Matching memberships ordered by join time.
    async fn list_memberships(&self, filter: &MembershipFilter) -> Result<Vec<Membership>, GifterError>;
    async fn count_memberships(&self, filter: &MembershipFilter) -> Result<usize, GifterError>;
    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>, GifterError>;
    /// Events of a group ordered by creation time.
    async fn list_events(&self, group_id: GroupId) -> Result<Vec<Event>, GifterError>;
    async fn commit(&self, commit: Commit) -> Result<(), GifterError>;
}

pub mod in_memory;
