pub mod in_memory;

use crate::core::errors::GifterError;
use crate::core::models::{User, UserId};
use async_trait::async_trait;

/// Resolves externally issued user identifiers.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, GifterError>;
}
