//! Group membership and the admin invariant.
//!
//! A group that has members always has at least one admin. Every mutation
//! here reads the state it decides on, then commits with guards restating
//! those reads, so a concurrent change turns into a `Conflict` instead of an
//! admin-less group.

use crate::core::constants::{
    ADMIN_CHECKED, MEMBER_ADDED, MEMBER_DEMOTED, MEMBER_PROMOTED, MEMBER_REMOVED, MEMBERS_LISTED,
    MEMBERSHIP_CHECKED, USER_FORGOTTEN, USER_GROUPS_LISTED,
};
use crate::core::errors::GifterError;
use crate::core::models::{Group, GroupId, GroupMember, Membership, MembershipStatus, User, UserId};
use crate::core::services::{OpContext, audit, report, run};
use crate::infrastructure::identity::IdentityLookup;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::{Commit, Guard, MembershipFilter, Storage, Write};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde_json::json;
use tracing::{info, warn};

pub struct MembershipEngine<S: Storage, I: IdentityLookup, L: LoggingService> {
    storage: S,
    identity: I,
    logging: L,
}

impl<S: Storage, I: IdentityLookup, L: LoggingService> MembershipEngine<S, I, L> {
    pub fn new(storage: S, identity: I, logging: L) -> Self {
        MembershipEngine {
            storage,
            identity,
            logging,
        }
    }

    /// Adds `user_id` to the group. The first member of a group becomes its admin.
    pub async fn add_member(&self, group_id: GroupId, user_id: &UserId) -> Result<Membership, GifterError> {
        let ctx = OpContext::new(MEMBER_ADDED).group(group_id).user(user_id);
        run(ctx, async {
            self.require_group(group_id).await?;
            self.require_user(user_id).await?;
            if self.storage.get_membership(group_id, user_id).await?.is_some() {
                return Err(GifterError::AlreadyMember {
                    group_id,
                    user_id: user_id.clone(),
                });
            }

            let members = MembershipFilter::group(group_id);
            let is_admin = self.storage.count_memberships(&members).await? == 0;
            let size_guard = if is_admin {
                Guard::MembersAtMost {
                    filter: members,
                    max: 0,
                }
            } else {
                Guard::MembersAtLeast {
                    filter: members,
                    min: 1,
                }
            };

            let membership = Membership::new(group_id, user_id.clone(), is_admin);
            self.storage
                .commit(
                    Commit::new()
                        .guard(Guard::GroupExists(group_id))
                        .guard(Guard::MembershipAbsent {
                            group_id,
                            user_id: user_id.clone(),
                        })
                        .guard(size_guard)
                        .write(Write::PutMembership(membership.clone())),
                )
                .await?;

            audit(
                &self.logging,
                MEMBER_ADDED,
                json!({ "group_id": group_id, "user_id": user_id, "is_admin": is_admin }),
                Some(user_id),
                Some(group_id),
            )
            .await;
            info!(is_admin, "member added");
            Ok(membership)
        })
        .await
    }

    /// Removes a member. The sole admin can only leave once nobody else is left.
    pub async fn remove_member(&self, group_id: GroupId, user_id: &UserId) -> Result<(), GifterError> {
        let ctx = OpContext::new(MEMBER_REMOVED).group(group_id).user(user_id);
        run(ctx, async {
            self.require_group(group_id).await?;
            self.require_user(user_id).await?;
            let membership = self.require_membership(group_id, user_id).await?;

            let mut commit = Commit::new().guard(Guard::MembershipPresent {
                group_id,
                user_id: user_id.clone(),
                is_admin: membership.is_admin,
            });

            if membership.is_admin {
                let members = MembershipFilter::group(group_id);
                let admins = self.storage.count_memberships(&members.clone().admins()).await?;
                if admins > 1 {
                    commit = commit.guard(Guard::MembersAtLeast {
                        filter: members.admins(),
                        min: 2,
                    });
                } else {
                    let total = self.storage.count_memberships(&members).await?;
                    if total > 1 {
                        return Err(GifterError::SoleAdminViolation {
                            group_id,
                            user_id: user_id.clone(),
                        });
                    }
                    commit = commit.guard(Guard::MembersAtMost {
                        filter: members,
                        max: 1,
                    });
                }
            }

            self.storage
                .commit(commit.write(Write::DeleteMembership {
                    group_id,
                    user_id: user_id.clone(),
                }))
                .await?;

            audit(
                &self.logging,
                MEMBER_REMOVED,
                json!({ "group_id": group_id, "user_id": user_id, "was_admin": membership.is_admin }),
                Some(user_id),
                Some(group_id),
            )
            .await;
            info!("member removed");
            Ok(())
        })
        .await
    }

    /// Grants admin. Promoting an admin is a no-op.
    pub async fn promote_to_admin(&self, group_id: GroupId, user_id: &UserId) -> Result<Membership, GifterError> {
        let ctx = OpContext::new(MEMBER_PROMOTED).group(group_id).user(user_id);
        run(ctx, async {
            self.require_group(group_id).await?;
            let membership = self.require_membership(group_id, user_id).await?;
            if membership.is_admin {
                return Ok(membership);
            }

            let promoted = Membership {
                is_admin: true,
                ..membership
            };
            self.storage
                .commit(
                    Commit::new()
                        .guard(Guard::MembershipPresent {
                            group_id,
                            user_id: user_id.clone(),
                            is_admin: false,
                        })
                        .write(Write::PutMembership(promoted.clone())),
                )
                .await?;

            audit(
                &self.logging,
                MEMBER_PROMOTED,
                json!({ "group_id": group_id, "user_id": user_id }),
                Some(user_id),
                Some(group_id),
            )
            .await;
            info!("member promoted to admin");
            Ok(promoted)
        })
        .await
    }

    /// Revokes admin unless this is the group's only admin. Demoting a
    /// non-admin is a no-op.
    pub async fn demote_from_admin(&self, group_id: GroupId, user_id: &UserId) -> Result<Membership, GifterError> {
        let ctx = OpContext::new(MEMBER_DEMOTED).group(group_id).user(user_id);
        run(ctx, async {
            self.require_group(group_id).await?;
            let membership = self.require_membership(group_id, user_id).await?;
            if !membership.is_admin {
                return Ok(membership);
            }

            let admins = MembershipFilter::group(group_id).admins();
            if self.storage.count_memberships(&admins).await? <= 1 {
                return Err(GifterError::SoleAdminViolation {
                    group_id,
                    user_id: user_id.clone(),
                });
            }

            let demoted = Membership {
                is_admin: false,
                ..membership
            };
            self.storage
                .commit(
                    Commit::new()
                        .guard(Guard::MembershipPresent {
                            group_id,
                            user_id: user_id.clone(),
                            is_admin: true,
                        })
                        .guard(Guard::MembersAtLeast {
                            filter: admins,
                            min: 2,
                        })
                        .write(Write::PutMembership(demoted.clone())),
                )
                .await?;

            audit(
                &self.logging,
                MEMBER_DEMOTED,
                json!({ "group_id": group_id, "user_id": user_id }),
                Some(user_id),
                Some(group_id),
            )
            .await;
            info!("admin demoted to member");
            Ok(demoted)
        })
        .await
    }

    /// Deletes every membership of a user who is leaving the identity
    /// provider. The user need not resolve any more. Where they were the sole
    /// admin of a group with other members, the longest-standing member is
    /// promoted in the same commit. Returns the groups they were removed from.
    pub async fn forget_user(&self, user_id: &UserId) -> Result<Vec<GroupId>, GifterError> {
        let ctx = OpContext::new(USER_FORGOTTEN).user(user_id);
        run(ctx, async {
            let memberships = self
                .storage
                .list_memberships(&MembershipFilter::user(user_id.clone()))
                .await?;
            if memberships.is_empty() {
                return Ok(Vec::new());
            }

            let mut commit = Commit::new();
            let mut successors = Vec::new();
            for membership in &memberships {
                let group_id = membership.group_id;
                commit = commit.guard(Guard::MembershipPresent {
                    group_id,
                    user_id: user_id.clone(),
                    is_admin: membership.is_admin,
                });
                if !membership.is_admin {
                    continue;
                }

                let members = MembershipFilter::group(group_id);
                if self.storage.count_memberships(&members.clone().admins()).await? > 1 {
                    commit = commit.guard(Guard::MembersAtLeast {
                        filter: members.admins(),
                        min: 2,
                    });
                    continue;
                }
                let successor = self
                    .storage
                    .list_memberships(&members)
                    .await?
                    .into_iter()
                    .find(|m| m.user_id != *user_id);
                match successor {
                    Some(successor) => {
                        let promoted = Membership {
                            is_admin: true,
                            ..successor
                        };
                        commit = commit
                            .guard(Guard::MembershipPresent {
                                group_id,
                                user_id: promoted.user_id.clone(),
                                is_admin: false,
                            })
                            .write(Write::PutMembership(promoted.clone()));
                        successors.push(promoted);
                    }
                    None => {
                        commit = commit.guard(Guard::MembersAtMost {
                            filter: members,
                            max: 1,
                        });
                    }
                }
            }
            self.storage
                .commit(commit.write(Write::DeleteUserMemberships(user_id.clone())))
                .await?;

            for membership in &memberships {
                audit(
                    &self.logging,
                    MEMBER_REMOVED,
                    json!({
                        "group_id": membership.group_id,
                        "user_id": user_id,
                        "was_admin": membership.is_admin,
                        "reason": "user_deleted",
                    }),
                    Some(user_id),
                    Some(membership.group_id),
                )
                .await;
            }
            for promoted in &successors {
                audit(
                    &self.logging,
                    MEMBER_PROMOTED,
                    json!({ "group_id": promoted.group_id, "user_id": promoted.user_id, "succeeds": user_id }),
                    Some(&promoted.user_id),
                    Some(promoted.group_id),
                )
                .await;
            }
            info!(groups = memberships.len(), promoted = successors.len(), "user memberships removed");
            Ok(memberships.into_iter().map(|m| m.group_id).collect())
        })
        .await
    }

    pub async fn is_member(&self, group_id: GroupId, user_id: &UserId) -> Result<bool, GifterError> {
        let ctx = OpContext::new(MEMBERSHIP_CHECKED).group(group_id).user(user_id);
        run(ctx, async { Ok(self.storage.get_membership(group_id, user_id).await?.is_some()) }).await
    }

    pub async fn is_admin(&self, group_id: GroupId, user_id: &UserId) -> Result<bool, GifterError> {
        let ctx = OpContext::new(ADMIN_CHECKED).group(group_id).user(user_id);
        run(ctx, async {
            Ok(self
                .storage
                .get_membership(group_id, user_id)
                .await?
                .is_some_and(|m| m.is_admin))
        })
        .await
    }

    /// Both flags from a single lookup.
    pub async fn status(&self, group_id: GroupId, user_id: &UserId) -> Result<MembershipStatus, GifterError> {
        let ctx = OpContext::new(MEMBERSHIP_CHECKED).group(group_id).user(user_id);
        run(ctx, async {
            Ok(match self.storage.get_membership(group_id, user_id).await? {
                Some(m) => MembershipStatus {
                    is_member: true,
                    is_admin: m.is_admin,
                },
                None => MembershipStatus::default(),
            })
        })
        .await
    }

    /// Lazily yields the group's users. Nothing is read until the stream is
    /// polled, and every call scans current state again. A missing group
    /// yields nothing.
    pub fn list_members(&self, group_id: GroupId) -> BoxStream<'_, Result<User, GifterError>> {
        let scan = stream::once(async move { self.storage.list_memberships(&MembershipFilter::group(group_id)).await });
        scan.map_ok(|memberships| stream::iter(memberships.into_iter().map(Ok::<Membership, GifterError>)))
            .try_flatten()
            .try_filter_map(move |membership| async move { self.resolve(&membership).await })
            .inspect_err(move |err| report(&OpContext::new(MEMBERS_LISTED).group(group_id), err))
            .boxed()
    }

    /// Memberships of a group with their admin flags, oldest first.
    pub async fn list_memberships(&self, group_id: GroupId) -> Result<Vec<Membership>, GifterError> {
        let ctx = OpContext::new(MEMBERS_LISTED).group(group_id);
        run(ctx, async {
            self.storage
                .list_memberships(&MembershipFilter::group(group_id))
                .await
        })
        .await
    }

    pub async fn groups_for_user(&self, user_id: &UserId) -> Result<Vec<Group>, GifterError> {
        let ctx = OpContext::new(USER_GROUPS_LISTED).user(user_id);
        run(ctx, async {
            let group_ids: Vec<GroupId> = self
                .storage
                .list_memberships(&MembershipFilter::user(user_id.clone()))
                .await?
                .into_iter()
                .map(|m| m.group_id)
                .collect();
            self.storage.list_groups(&group_ids).await
        })
        .await
    }

    /// Adds the founding membership of a group that is created in the same
    /// commit. The founder is the first member, hence admin.
    pub fn stage_founder(&self, commit: Commit, group_id: GroupId, user_id: &UserId) -> (Commit, Membership) {
        let founder = Membership::new(group_id, user_id.clone(), true);
        let commit = commit
            .guard(Guard::MembersAtMost {
                filter: MembershipFilter::group(group_id),
                max: 0,
            })
            .write(Write::PutMembership(founder.clone()));
        (commit, founder)
    }

    /// Members with resolved user records, for read models. Errors are left
    /// to the caller's boundary.
    pub(crate) async fn roster(&self, group_id: GroupId) -> Result<Vec<GroupMember>, GifterError> {
        let memberships = self
            .storage
            .list_memberships(&MembershipFilter::group(group_id))
            .await?;
        let mut members = Vec::with_capacity(memberships.len());
        for membership in memberships {
            if let Some(user) = self.resolve(&membership).await? {
                members.push(GroupMember {
                    user,
                    is_admin: membership.is_admin,
                });
            }
        }
        Ok(members)
    }

    async fn resolve(&self, membership: &Membership) -> Result<Option<User>, GifterError> {
        let user = self.identity.find_user(&membership.user_id).await?;
        if user.is_none() {
            warn!(
                group_id = %membership.group_id,
                user_id = %membership.user_id,
                "membership references an unknown user, skipping"
            );
        }
        Ok(user)
    }

    async fn require_group(&self, group_id: GroupId) -> Result<Group, GifterError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or(GifterError::GroupNotFound(group_id))
    }

    async fn require_user(&self, user_id: &UserId) -> Result<User, GifterError> {
        self.identity
            .find_user(user_id)
            .await?
            .ok_or_else(|| GifterError::UserNotFound(user_id.clone()))
    }

    async fn require_membership(&self, group_id: GroupId, user_id: &UserId) -> Result<Membership, GifterError> {
        self.storage
            .get_membership(group_id, user_id)
            .await?
            .ok_or_else(|| GifterError::MembershipNotFound {
                group_id,
                user_id: user_id.clone(),
            })
    }
}
