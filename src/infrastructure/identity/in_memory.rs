use crate::core::errors::GifterError;
use crate::core::models::{User, UserId};
use crate::infrastructure::identity::IdentityLookup;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryIdentity {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        InMemoryIdentity {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a user, replacing any previous profile with the same id.
    pub async fn upsert_user(&self, user: User) -> User {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user.clone());
        user
    }

    /// Drops the profile only. Memberships are cleared by
    /// `MembershipEngine::forget_user`; the server does both in `AppState::remove_user`.
    pub async fn remove_user(&self, user_id: &UserId) -> Option<User> {
        self.users.write().await.remove(user_id)
    }
}

#[async_trait]
impl IdentityLookup for InMemoryIdentity {
    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, GifterError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }
}
