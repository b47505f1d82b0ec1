pub mod in_memory;

use crate::core::errors::GifterError;
use crate::core::models::{AppLog, GroupId, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait LoggingService: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&UserId>,
        group_id: Option<GroupId>,
    ) -> Result<(), GifterError>;
    async fn get_logs(&self) -> Result<Vec<AppLog>, GifterError>;
}
