mod api_tests;

use crate::core::errors::GifterError;
use crate::core::models::{AppLog, Event, EventId, Group, GroupId, Membership, User, UserId};
use crate::core::services::GroupDirectory;
use crate::infrastructure::identity::in_memory::InMemoryIdentity;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use crate::infrastructure::storage::{Commit, MembershipFilter, Storage, Write};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Barrier;

pub type TestDirectory = GroupDirectory<InMemoryStorage, InMemoryIdentity, InMemoryLogging>;

pub struct TestContext {
    pub directory: TestDirectory,
    pub storage: InMemoryStorage,
    pub identity: InMemoryIdentity,
    pub logging: InMemoryLogging,
}

/// In-memory stack with users `alice`, `bob` and `carol` registered.
pub async fn create_test_context() -> TestContext {
    let storage = InMemoryStorage::new();
    let identity = InMemoryIdentity::new();
    let logging = InMemoryLogging::new();
    for (id, name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")] {
        identity.upsert_user(User::new(id, name)).await;
    }
    let directory = GroupDirectory::new(storage.clone(), identity.clone(), logging.clone());
    TestContext {
        directory,
        storage,
        identity,
        logging,
    }
}

pub fn uid(id: &str) -> UserId {
    UserId::from(id)
}

/// A group with no members, written straight to storage.
pub async fn empty_group(storage: &InMemoryStorage, name: &str) -> Group {
    let group = Group::new(name.to_string(), None);
    storage
        .commit(Commit::new().write(Write::PutGroup(group.clone())))
        .await
        .unwrap();
    group
}

pub async fn member_count(storage: &InMemoryStorage, group_id: GroupId) -> usize {
    storage
        .count_memberships(&MembershipFilter::group(group_id))
        .await
        .unwrap()
}

pub async fn admin_count(storage: &InMemoryStorage, group_id: GroupId) -> usize {
    storage
        .count_memberships(&MembershipFilter::group(group_id).admins())
        .await
        .unwrap()
}

/// Delegates to the wrapped store. Commits fail once `fail_commits` is set;
/// with a count gate, `count_memberships` waits until every party has counted.
#[derive(Clone, Default)]
pub struct ScriptedStorage {
    pub inner: InMemoryStorage,
    fail_commits: Arc<AtomicBool>,
    count_gate: Option<Arc<Barrier>>,
}

impl ScriptedStorage {
    pub const MESSAGE: &'static str = "connection reset by peer";

    pub fn gated(parties: usize) -> Self {
        ScriptedStorage {
            count_gate: Some(Arc::new(Barrier::new(parties))),
            ..Default::default()
        }
    }

    pub fn fail_commits(&self) {
        self.fail_commits.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for ScriptedStorage {
    async fn get_group(&self, group_id: GroupId) -> Result<Option<Group>, GifterError> {
        self.inner.get_group(group_id).await
    }

    async fn list_groups(&self, group_ids: &[GroupId]) -> Result<Vec<Group>, GifterError> {
        self.inner.list_groups(group_ids).await
    }

    async fn get_membership(&self, group_id: GroupId, user_id: &UserId) -> Result<Option<Membership>, GifterError> {
        self.inner.get_membership(group_id, user_id).await
    }

    async fn list_memberships(&self, filter: &MembershipFilter) -> Result<Vec<Membership>, GifterError> {
        self.inner.list_memberships(filter).await
    }

    async fn count_memberships(&self, filter: &MembershipFilter) -> Result<usize, GifterError> {
        let count = self.inner.count_memberships(filter).await?;
        if let Some(gate) = &self.count_gate {
            gate.wait().await;
        }
        Ok(count)
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>, GifterError> {
        self.inner.get_event(event_id).await
    }

    async fn list_events(&self, group_id: GroupId) -> Result<Vec<Event>, GifterError> {
        self.inner.list_events(group_id).await
    }

    async fn commit(&self, commit: Commit) -> Result<(), GifterError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(GifterError::StorageError(Self::MESSAGE.to_string()));
        }
        self.inner.commit(commit).await
    }
}

/// Audit sink that rejects every entry.
#[derive(Clone, Default)]
pub struct FailingLogging;

#[async_trait]
impl LoggingService for FailingLogging {
    async fn log_action(
        &self,
        _action: &str,
        _details: serde_json::Value,
        _user_id: Option<&UserId>,
        _group_id: Option<GroupId>,
    ) -> Result<(), GifterError> {
        Err(GifterError::LoggingError("audit sink unavailable".to_string()))
    }

    async fn get_logs(&self) -> Result<Vec<AppLog>, GifterError> {
        Ok(Vec::new())
    }
}
