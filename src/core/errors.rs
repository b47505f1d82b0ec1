use crate::core::models::{EventId, GroupId, UserId};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Coarse classification callers switch on when translating errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyMember,
    SoleAdminViolation,
    InvalidArgument,
    /// Failure reported by the persistence gateway or the audit sink.
    Gateway,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GifterError {
    #[error("Group {0} not found")]
    GroupNotFound(GroupId),
    #[error("User {0} not found")]
    UserNotFound(UserId),
    #[error("User {user_id} is not a member of group {group_id}")]
    MembershipNotFound { group_id: GroupId, user_id: UserId },
    #[error("Event {0} not found")]
    EventNotFound(EventId),
    #[error("User {user_id} is already a member of group {group_id}")]
    AlreadyMember { group_id: GroupId, user_id: UserId },
    #[error("User {user_id} is the only admin of group {group_id}")]
    SoleAdminViolation { group_id: GroupId, user_id: UserId },
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    /// A commit precondition no longer held when the write was applied.
    #[error("Write conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
}

impl GifterError {
    pub fn invalid_input(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        GifterError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GifterError::GroupNotFound(_)
            | GifterError::UserNotFound(_)
            | GifterError::MembershipNotFound { .. }
            | GifterError::EventNotFound(_) => ErrorKind::NotFound,
            GifterError::AlreadyMember { .. } => ErrorKind::AlreadyMember,
            GifterError::SoleAdminViolation { .. } => ErrorKind::SoleAdminViolation,
            GifterError::InvalidInput(..) => ErrorKind::InvalidArgument,
            GifterError::Conflict(_) | GifterError::StorageError(_) | GifterError::LoggingError(_) => {
                ErrorKind::Gateway
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
