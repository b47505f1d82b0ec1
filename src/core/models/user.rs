use super::ids::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User record as resolved through the identity directory.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
}

impl User {
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        User {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}
