use crate::core::errors::GifterError;
use crate::core::models::{AppLog, GroupId, UserId};
use crate::infrastructure::logging::LoggingService;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryLogging {
    logs: Arc<RwLock<Vec<AppLog>>>,
}

impl InMemoryLogging {
    pub fn new() -> Self {
        InMemoryLogging {
            logs: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

#[async_trait]
impl LoggingService for InMemoryLogging {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&UserId>,
        group_id: Option<GroupId>,
    ) -> Result<(), GifterError> {
        if !details.is_object() {
            return Err(GifterError::LoggingError(format!(
                "details for {} must be a JSON object",
                action
            )));
        }
        let mut logs = self.logs.write().await;
        logs.push(AppLog {
            id: Uuid::new_v4(),
            action: action.to_string(),
            user_id: user_id.cloned(),
            group_id,
            details,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    async fn get_logs(&self) -> Result<Vec<AppLog>, GifterError> {
        let logs = self.logs.read().await;
        Ok(logs.clone())
    }
}
