use super::ids::{EventId, GroupId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub group_id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(group_id: GroupId, name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Event {
            id: EventId::new(),
            group_id,
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}
