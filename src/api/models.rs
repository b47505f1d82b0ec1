use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::GifterError;
use crate::core::models::UserId;

#[derive(Deserialize, ToSchema)]
pub struct UpsertUserRequest {
    pub display_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub creator_id: UserId,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: UserId,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for GifterError to implement IntoResponse
pub struct ApiError(pub GifterError);

impl From<GifterError> for ApiError {
    fn from(err: GifterError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            GifterError::GroupNotFound(_)
            | GifterError::UserNotFound(_)
            | GifterError::MembershipNotFound { .. }
            | GifterError::EventNotFound(_) => StatusCode::NOT_FOUND,
            GifterError::AlreadyMember { .. } | GifterError::SoleAdminViolation { .. } | GifterError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            GifterError::InvalidInput(..) => StatusCode::BAD_REQUEST,
            GifterError::StorageError(_) | GifterError::LoggingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let error = match &self.0 {
            GifterError::InvalidInput(_, field_error) => field_error.description.clone(),
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
