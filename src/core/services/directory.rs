use crate::core::constants::{
    EVENT_CREATED, EVENT_DELETED, EVENT_QUERIED, EVENT_UPDATED, EVENTS_LISTED, GROUP_CREATED, GROUP_DELETED,
    GROUP_EXISTS_CHECKED, GROUP_QUERIED, GROUP_UPDATED, MAX_NAME_LENGTH,
};
use crate::core::errors::GifterError;
use crate::core::models::{AppLog, Event, EventId, Group, GroupDetails, GroupId, UserId};
use crate::core::services::membership::MembershipEngine;
use crate::core::services::{
    OpContext, audit, normalize_description, run, validate_description, validate_string_input,
};
use crate::infrastructure::identity::IdentityLookup;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::{Commit, Guard, Storage, Write};
use chrono::Utc;
use serde_json::json;
use tracing::info;

/// Lifecycle of groups and their events. Anything touching membership goes
/// through the [`MembershipEngine`].
pub struct GroupDirectory<S: Storage, I: IdentityLookup, L: LoggingService> {
    storage: S,
    identity: I,
    logging: L,
    members: MembershipEngine<S, I, L>,
}

impl<S, I, L> GroupDirectory<S, I, L>
where
    S: Storage + Clone,
    I: IdentityLookup + Clone,
    L: LoggingService + Clone,
{
    pub fn new(storage: S, identity: I, logging: L) -> Self {
        let members = MembershipEngine::new(storage.clone(), identity.clone(), logging.clone());
        GroupDirectory {
            storage,
            identity,
            logging,
            members,
        }
    }
}

impl<S: Storage, I: IdentityLookup, L: LoggingService> GroupDirectory<S, I, L> {
    pub fn members(&self) -> &MembershipEngine<S, I, L> {
        &self.members
    }

    /// Creates a group with `creator` as its founding admin, in one commit.
    pub async fn create_group(
        &self,
        name: String,
        description: Option<String>,
        creator: &UserId,
    ) -> Result<Group, GifterError> {
        let ctx = OpContext::new(GROUP_CREATED).user(creator);
        run(ctx, async {
            validate_string_input("name", &name, MAX_NAME_LENGTH)?;
            let description = normalize_description(description);
            validate_description(description.as_deref())?;
            if self.identity.find_user(creator).await?.is_none() {
                return Err(GifterError::invalid_input(
                    "creator_user_id",
                    "Unknown creator",
                    format!("User {} could not be resolved", creator),
                ));
            }

            let group = Group::new(name.trim().to_string(), description);
            let commit = Commit::new().write(Write::PutGroup(group.clone()));
            let (commit, founder) = self.members.stage_founder(commit, group.id, creator);
            self.storage.commit(commit).await?;

            audit(
                &self.logging,
                GROUP_CREATED,
                json!({ "group_id": group.id, "name": group.name, "founder_id": founder.user_id }),
                Some(creator),
                Some(group.id),
            )
            .await;
            info!(group_id = %group.id, "group created");
            Ok(group)
        })
        .await
    }

    /// The group with its current members and events.
    pub async fn get_group(&self, group_id: GroupId) -> Result<GroupDetails, GifterError> {
        let ctx = OpContext::new(GROUP_QUERIED).group(group_id);
        run(ctx, async {
            let group = self.require_group(group_id).await?;
            let members = self.members.roster(group_id).await?;
            let events = self.storage.list_events(group_id).await?;
            Ok(GroupDetails {
                group,
                members,
                events,
            })
        })
        .await
    }

    /// Overwrites name and description. Creation time is kept from the stored record.
    pub async fn update_group(&self, group: Group) -> Result<Group, GifterError> {
        let group_id = group.id;
        let ctx = OpContext::new(GROUP_UPDATED).group(group_id);
        run(ctx, async {
            let existing = self.require_group(group_id).await?;
            validate_string_input("name", &group.name, MAX_NAME_LENGTH)?;
            let description = normalize_description(group.description);
            validate_description(description.as_deref())?;

            let updated = Group {
                id: group_id,
                name: group.name.trim().to_string(),
                description,
                created_at: existing.created_at,
                updated_at: Utc::now(),
            };
            self.storage
                .commit(
                    Commit::new()
                        .guard(Guard::GroupExists(group_id))
                        .write(Write::PutGroup(updated.clone())),
                )
                .await?;

            audit(
                &self.logging,
                GROUP_UPDATED,
                json!({ "group_id": group_id, "old_name": existing.name, "name": updated.name }),
                None,
                Some(group_id),
            )
            .await;
            Ok(updated)
        })
        .await
    }

    /// Deletes the group together with its memberships and events.
    pub async fn delete_group(&self, group_id: GroupId) -> Result<(), GifterError> {
        let ctx = OpContext::new(GROUP_DELETED).group(group_id);
        run(ctx, async {
            let group = self.require_group(group_id).await?;
            self.storage
                .commit(
                    Commit::new()
                        .guard(Guard::GroupExists(group_id))
                        .write(Write::DeleteGroup(group_id)),
                )
                .await?;

            audit(
                &self.logging,
                GROUP_DELETED,
                json!({ "group_id": group_id, "name": group.name }),
                None,
                Some(group_id),
            )
            .await;
            info!("group deleted");
            Ok(())
        })
        .await
    }

    pub async fn group_exists(&self, group_id: GroupId) -> Result<bool, GifterError> {
        let ctx = OpContext::new(GROUP_EXISTS_CHECKED).group(group_id);
        run(ctx, async { Ok(self.storage.get_group(group_id).await?.is_some()) }).await
    }

    pub async fn groups_for_user(&self, user_id: &UserId) -> Result<Vec<Group>, GifterError> {
        self.members.groups_for_user(user_id).await
    }

    pub async fn create_event(
        &self,
        group_id: GroupId,
        name: String,
        description: Option<String>,
    ) -> Result<Event, GifterError> {
        let ctx = OpContext::new(EVENT_CREATED).group(group_id);
        run(ctx, async {
            self.require_group(group_id).await?;
            validate_string_input("name", &name, MAX_NAME_LENGTH)?;
            let description = normalize_description(description);
            validate_description(description.as_deref())?;

            let event = Event::new(group_id, name.trim().to_string(), description);
            self.storage
                .commit(
                    Commit::new()
                        .guard(Guard::GroupExists(group_id))
                        .write(Write::PutEvent(event.clone())),
                )
                .await?;

            audit(
                &self.logging,
                EVENT_CREATED,
                json!({ "event_id": event.id, "group_id": group_id, "name": event.name }),
                None,
                Some(group_id),
            )
            .await;
            Ok(event)
        })
        .await
    }

    pub async fn get_event(&self, event_id: EventId) -> Result<Event, GifterError> {
        let ctx = OpContext::new(EVENT_QUERIED).event(event_id);
        run(ctx, self.require_event(event_id)).await
    }

    pub async fn list_events(&self, group_id: GroupId) -> Result<Vec<Event>, GifterError> {
        let ctx = OpContext::new(EVENTS_LISTED).group(group_id);
        run(ctx, async {
            self.require_group(group_id).await?;
            self.storage.list_events(group_id).await
        })
        .await
    }

    /// Overwrites name and description. An event never moves between groups.
    pub async fn update_event(&self, event: Event) -> Result<Event, GifterError> {
        let event_id = event.id;
        let ctx = OpContext::new(EVENT_UPDATED).event(event_id);
        run(ctx, async {
            let existing = self.require_event(event_id).await?;
            validate_string_input("name", &event.name, MAX_NAME_LENGTH)?;
            let description = normalize_description(event.description);
            validate_description(description.as_deref())?;

            let updated = Event {
                id: event_id,
                group_id: existing.group_id,
                name: event.name.trim().to_string(),
                description,
                created_at: existing.created_at,
                updated_at: Utc::now(),
            };
            self.storage
                .commit(
                    Commit::new()
                        .guard(Guard::EventExists(event_id))
                        .write(Write::PutEvent(updated.clone())),
                )
                .await?;

            audit(
                &self.logging,
                EVENT_UPDATED,
                json!({ "event_id": event_id, "group_id": updated.group_id, "name": updated.name }),
                None,
                Some(updated.group_id),
            )
            .await;
            Ok(updated)
        })
        .await
    }

    pub async fn delete_event(&self, event_id: EventId) -> Result<(), GifterError> {
        let ctx = OpContext::new(EVENT_DELETED).event(event_id);
        run(ctx, async {
            let event = self.require_event(event_id).await?;
            self.storage
                .commit(
                    Commit::new()
                        .guard(Guard::EventExists(event_id))
                        .write(Write::DeleteEvent(event_id)),
                )
                .await?;

            audit(
                &self.logging,
                EVENT_DELETED,
                json!({ "event_id": event_id, "group_id": event.group_id }),
                None,
                Some(event.group_id),
            )
            .await;
            Ok(())
        })
        .await
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, GifterError> {
        self.logging.get_logs().await
    }

    async fn require_group(&self, group_id: GroupId) -> Result<Group, GifterError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or(GifterError::GroupNotFound(group_id))
    }

    async fn require_event(&self, event_id: EventId) -> Result<Event, GifterError> {
        self.storage
            .get_event(event_id)
            .await?
            .ok_or(GifterError::EventNotFound(event_id))
    }
}
