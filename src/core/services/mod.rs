pub mod directory;
pub mod membership;

pub use directory::GroupDirectory;
pub use membership::MembershipEngine;

use crate::core::constants::MAX_DESCRIPTION_LENGTH;
use crate::core::errors::{ErrorKind, GifterError};
use crate::core::models::{EventId, GroupId, UserId};
use crate::infrastructure::logging::LoggingService;
use std::future::Future;
use tracing::{Instrument, debug, error, info_span, warn};

/// Diagnostic context attached to one public operation.
#[derive(Clone, Debug)]
pub struct OpContext {
    pub operation: &'static str,
    pub group_id: Option<GroupId>,
    pub user_id: Option<UserId>,
    pub event_id: Option<EventId>,
}

impl OpContext {
    pub fn new(operation: &'static str) -> Self {
        OpContext {
            operation,
            group_id: None,
            user_id: None,
            event_id: None,
        }
    }

    pub fn group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn user(mut self, user_id: &UserId) -> Self {
        self.user_id = Some(user_id.clone());
        self
    }

    pub fn event(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }
}

/// Error boundary for every public operation: runs it inside a span carrying
/// the context, logs a failure once, and hands the error back unchanged.
pub(crate) async fn run<T, F>(ctx: OpContext, op: F) -> Result<T, GifterError>
where
    F: Future<Output = Result<T, GifterError>>,
{
    let span = info_span!(
        "gifter",
        operation = ctx.operation,
        group_id = ?ctx.group_id,
        user_id = ?ctx.user_id,
        event_id = ?ctx.event_id,
    );
    async {
        match op.await {
            Ok(value) => {
                debug!("operation completed");
                Ok(value)
            }
            Err(err) => {
                report(&ctx, &err);
                Err(err)
            }
        }
    }
    .instrument(span)
    .await
}

pub(crate) fn report(ctx: &OpContext, err: &GifterError) {
    match err.kind() {
        ErrorKind::Gateway => error!(
            operation = ctx.operation,
            group_id = ?ctx.group_id,
            user_id = ?ctx.user_id,
            event_id = ?ctx.event_id,
            error = %err,
            "gateway call failed"
        ),
        _ => warn!(
            operation = ctx.operation,
            group_id = ?ctx.group_id,
            user_id = ?ctx.user_id,
            event_id = ?ctx.event_id,
            error = %err,
            "operation rejected"
        ),
    }
}

/// Records an audit entry for a change that is already committed.
pub(crate) async fn audit<L: LoggingService>(
    logging: &L,
    action: &str,
    details: serde_json::Value,
    user_id: Option<&UserId>,
    group_id: Option<GroupId>,
) {
    if let Err(err) = logging.log_action(action, details, user_id, group_id).await {
        warn!(action, error = %err, "failed to record audit entry");
    }
}

pub(crate) fn validate_string_input(field: &str, value: &str, max_length: usize) -> Result<(), GifterError> {
    if value.trim().is_empty() {
        return Err(GifterError::invalid_input(
            field,
            format!("Invalid {}", field),
            format!("{} cannot be empty", field),
        ));
    }
    if value.chars().count() > max_length {
        return Err(GifterError::invalid_input(
            field,
            format!("{} Too Long", field),
            format!("{} cannot exceed {} characters", field, max_length),
        ));
    }
    if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
        return Err(GifterError::invalid_input(
            field,
            format!("Invalid {}", field),
            format!("{} contains invalid characters", field),
        ));
    }
    Ok(())
}

pub(crate) fn validate_description(description: Option<&str>) -> Result<(), GifterError> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => Err(GifterError::invalid_input(
            "description",
            "description Too Long",
            format!("description cannot exceed {} characters", MAX_DESCRIPTION_LENGTH),
        )),
        _ => Ok(()),
    }
}

/// Blank descriptions are stored as absent.
pub(crate) fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_and_markup_names() {
        assert!(matches!(
            validate_string_input("name", "   ", 100),
            Err(GifterError::InvalidInput(field, _)) if field == "name"
        ));
        assert!(validate_string_input("name", "<script>", 100).is_err());
        assert!(validate_string_input("name", &"x".repeat(101), 100).is_err());
        assert!(validate_string_input("name", "Family", 100).is_ok());
    }

    #[test]
    fn blank_description_becomes_none() {
        assert_eq!(normalize_description(Some("  ".to_string())), None);
        assert_eq!(normalize_description(Some(" gifts ".to_string())), Some("gifts".to_string()));
        assert!(validate_description(Some(&"d".repeat(501))).is_err());
    }
}
