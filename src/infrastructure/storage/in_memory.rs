use crate::core::errors::GifterError;
use crate::core::models::{Event, EventId, Group, GroupId, Membership, UserId};
use crate::infrastructure::storage::{Commit, Guard, MembershipFilter, Storage, Write};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Debug, Default)]
struct Tables {
    groups: HashMap<GroupId, Group>,
    memberships: HashMap<(GroupId, UserId), Membership>,
    events: HashMap<EventId, Event>,
}

impl Tables {
    fn count(&self, filter: &MembershipFilter) -> usize {
        self.memberships.values().filter(|m| filter.matches(m)).count()
    }

    fn check(&self, guard: &Guard) -> Result<(), GifterError> {
        let holds = match guard {
            Guard::GroupExists(group_id) => self.groups.contains_key(group_id),
            Guard::EventExists(event_id) => self.events.contains_key(event_id),
            Guard::MembershipAbsent { group_id, user_id } => {
                !self.memberships.contains_key(&(*group_id, user_id.clone()))
            }
            Guard::MembershipPresent {
                group_id,
                user_id,
                is_admin,
            } => self
                .memberships
                .get(&(*group_id, user_id.clone()))
                .is_some_and(|m| m.is_admin == *is_admin),
            Guard::MembersAtLeast { filter, min } => self.count(filter) >= *min,
            Guard::MembersAtMost { filter, max } => self.count(filter) <= *max,
        };
        if holds {
            Ok(())
        } else {
            Err(GifterError::Conflict(format!("precondition failed: {:?}", guard)))
        }
    }

    fn apply(&mut self, write: Write) -> Result<(), GifterError> {
        match write {
            Write::PutGroup(group) => {
                self.groups.insert(group.id, group);
            }
            Write::DeleteGroup(group_id) => {
                self.groups.remove(&group_id);
                self.memberships.retain(|(g, _), _| *g != group_id);
                self.events.retain(|_, e| e.group_id != group_id);
            }
            Write::PutMembership(membership) => {
                if !self.groups.contains_key(&membership.group_id) {
                    return Err(GifterError::StorageError(format!(
                        "membership references missing group {}",
                        membership.group_id
                    )));
                }
                self.memberships.insert(membership.key(), membership);
            }
            Write::DeleteMembership { group_id, user_id } => {
                self.memberships.remove(&(group_id, user_id));
            }
            Write::DeleteUserMemberships(user_id) => {
                self.memberships.retain(|(_, u), _| *u != user_id);
            }
            Write::PutEvent(event) => {
                if !self.groups.contains_key(&event.group_id) {
                    return Err(GifterError::StorageError(format!(
                        "event references missing group {}",
                        event.group_id
                    )));
                }
                self.events.insert(event.id, event);
            }
            Write::DeleteEvent(event_id) => {
                self.events.remove(&event_id);
            }
        }
        Ok(())
    }
}

/// Process-local gateway. One lock over all tables so a commit is serializable.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            tables: Arc::new(RwLock::new(Tables::default())),
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get_group(&self, group_id: GroupId) -> Result<Option<Group>, GifterError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.get(&group_id).cloned())
    }

    async fn list_groups(&self, group_ids: &[GroupId]) -> Result<Vec<Group>, GifterError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = group_ids
            .iter()
            .filter_map(|id| tables.groups.get(id).cloned())
            .collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        groups.dedup_by_key(|g| g.id);
        Ok(groups)
    }

    async fn get_membership(&self, group_id: GroupId, user_id: &UserId) -> Result<Option<Membership>, GifterError> {
        let tables = self.tables.read().await;
        Ok(tables.memberships.get(&(group_id, user_id.clone())).cloned())
    }

    async fn list_memberships(&self, filter: &MembershipFilter) -> Result<Vec<Membership>, GifterError> {
        let tables = self.tables.read().await;
        let mut memberships: Vec<Membership> = tables
            .memberships
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        memberships.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.user_id.cmp(&b.user_id)));
        Ok(memberships)
    }

    async fn count_memberships(&self, filter: &MembershipFilter) -> Result<usize, GifterError> {
        let tables = self.tables.read().await;
        Ok(tables.count(filter))
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>, GifterError> {
        let tables = self.tables.read().await;
        Ok(tables.events.get(&event_id).cloned())
    }

    async fn list_events(&self, group_id: GroupId) -> Result<Vec<Event>, GifterError> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn commit(&self, commit: Commit) -> Result<(), GifterError> {
        let mut tables = self.tables.write().await;
        for guard in commit.guards() {
            tables.check(guard)?;
        }
        // Stage on a copy; a failed write must not leave earlier writes behind.
        let mut staged = tables.clone();
        for write in commit.writes().iter().cloned() {
            staged.apply(write)?;
        }
        *tables = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(group_id: GroupId, user: &str, is_admin: bool) -> Membership {
        Membership::new(group_id, UserId::from(user), is_admin)
    }

    #[tokio::test]
    async fn commit_is_all_or_nothing() {
        let storage = InMemoryStorage::new();
        let group = Group::new("Family".to_string(), None);
        storage
            .commit(Commit::new().write(Write::PutGroup(group.clone())))
            .await
            .unwrap();

        // Second write references a group that does not exist.
        let orphan = membership(GroupId::new(), "bob", false);
        let result = storage
            .commit(
                Commit::new()
                    .write(Write::PutMembership(membership(group.id, "alice", true)))
                    .write(Write::PutMembership(orphan)),
            )
            .await;

        assert!(matches!(result, Err(GifterError::StorageError(_))));
        assert_eq!(storage.count_memberships(&MembershipFilter::group(group.id)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_guard_rejects_commit() {
        let storage = InMemoryStorage::new();
        let group = Group::new("Family".to_string(), None);
        storage
            .commit(
                Commit::new()
                    .write(Write::PutGroup(group.clone()))
                    .write(Write::PutMembership(membership(group.id, "alice", true))),
            )
            .await
            .unwrap();

        let result = storage
            .commit(
                Commit::new()
                    .guard(Guard::MembersAtMost {
                        filter: MembershipFilter::group(group.id),
                        max: 0,
                    })
                    .write(Write::PutMembership(membership(group.id, "bob", true))),
            )
            .await;

        assert!(matches!(result, Err(GifterError::Conflict(_))));
        assert!(storage.get_membership(group.id, &UserId::from("bob")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_group_cascades() {
        let storage = InMemoryStorage::new();
        let group = Group::new("Family".to_string(), None);
        let other = Group::new("Work".to_string(), None);
        let event = Event::new(group.id, "Christmas".to_string(), None);
        storage
            .commit(
                Commit::new()
                    .write(Write::PutGroup(group.clone()))
                    .write(Write::PutGroup(other.clone()))
                    .write(Write::PutMembership(membership(group.id, "alice", true)))
                    .write(Write::PutMembership(membership(other.id, "alice", true)))
                    .write(Write::PutEvent(event.clone())),
            )
            .await
            .unwrap();

        storage
            .commit(Commit::new().write(Write::DeleteGroup(group.id)))
            .await
            .unwrap();

        assert!(storage.get_group(group.id).await.unwrap().is_none());
        assert!(storage.get_event(event.id).await.unwrap().is_none());
        let remaining = storage
            .list_memberships(&MembershipFilter::user(UserId::from("alice")))
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].group_id, other.id);
    }

    #[tokio::test]
    async fn admin_filter_counts_only_admins() {
        let storage = InMemoryStorage::new();
        let group = Group::new("Family".to_string(), None);
        storage
            .commit(
                Commit::new()
                    .write(Write::PutGroup(group.clone()))
                    .write(Write::PutMembership(membership(group.id, "alice", true)))
                    .write(Write::PutMembership(membership(group.id, "bob", false)))
                    .write(Write::PutMembership(membership(group.id, "carol", false))),
            )
            .await
            .unwrap();

        let all = MembershipFilter::group(group.id);
        assert_eq!(storage.count_memberships(&all).await.unwrap(), 3);
        assert_eq!(storage.count_memberships(&all.admins()).await.unwrap(), 1);
    }
}
