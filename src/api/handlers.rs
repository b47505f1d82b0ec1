use crate::{
    api::{AppState, models::*},
    core::{
        constants::MAX_NAME_LENGTH,
        errors::GifterError,
        models::{AppLog, Event, EventId, Group, GroupDetails, GroupId, Membership, MembershipStatus, User, UserId},
        services::validate_string_input,
    },
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use futures::TryStreamExt;

// Define API routes
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/users/{user_id}", put(upsert_user).delete(delete_user))
        .route("/users/{user_id}/groups", get(list_user_groups))
        .route("/groups", post(create_group))
        .route(
            "/groups/{group_id}",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route("/groups/{group_id}/members", get(list_members).post(add_member))
        .route(
            "/groups/{group_id}/members/{user_id}",
            get(get_membership_status).delete(remove_member),
        )
        .route(
            "/groups/{group_id}/admins/{user_id}",
            post(promote_member).delete(demote_member),
        )
        .route("/groups/{group_id}/events", get(list_events).post(create_event))
        .route(
            "/events/{event_id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/logs", get(get_app_logs))
        .with_state(state)
}

#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    request_body = UpsertUserRequest,
    params(
        ("user_id" = String, Path, description = "Identifier issued by the identity provider")
    ),
    responses(
        (status = 200, description = "User registered", body = User),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
async fn upsert_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<UpsertUserRequest>,
) -> Result<Json<User>, ApiError> {
    validate_string_input("display_name", &req.display_name, MAX_NAME_LENGTH)?;
    let user = state
        .identity
        .upsert_user(User::new(user_id, req.display_name.trim()))
        .await;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "ID of the user to delete")
    ),
    responses(
        (status = 204, description = "User and all their memberships deleted"),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Memberships changed concurrently", body = ErrorResponse)
    )
)]
async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    state.remove_user(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/groups",
    params(
        ("user_id" = String, Path, description = "ID of the user")
    ),
    responses(
        (status = 200, description = "Groups the user belongs to", body = [Group]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn list_user_groups(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let groups = state.directory.groups_for_user(&user_id).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created with the creator as admin", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_group(
    State(state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let group = state
        .directory
        .create_group(req.name, req.description, &req.creator_id)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Group with members and events", body = GroupDetails),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<GroupDetails>, ApiError> {
    let details = state.directory.get_group(group_id).await?;
    Ok(Json(details))
}

#[utoipa::path(
    put,
    path = "/api/groups/{group_id}",
    request_body = UpdateGroupRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Group updated", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
async fn update_group(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    let group = Group {
        id: group_id,
        ..Group::new(req.name, req.description)
    };
    let updated = state.directory.update_group(group).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{group_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group to delete")
    ),
    responses(
        (status = 204, description = "Group, memberships and events deleted"),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
async fn delete_group(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> Result<StatusCode, ApiError> {
    state.directory.delete_group(group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/members",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Members of the group", body = [User]),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
async fn list_members(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<User>>, ApiError> {
    if !state.directory.group_exists(group_id).await? {
        return Err(GifterError::GroupNotFound(group_id).into());
    }
    let users = state
        .directory
        .members()
        .list_members(group_id)
        .try_collect::<Vec<_>>()
        .await?;
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/members",
    request_body = AddMemberRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 201, description = "Member added; the first member becomes admin", body = Membership),
        (status = 404, description = "User or group not found", body = ErrorResponse),
        (status = 409, description = "User already a member", body = ErrorResponse)
    )
)]
async fn add_member(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<Membership>), ApiError> {
    let membership = state.directory.members().add_member(group_id, &req.user_id).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/members/{user_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        ("user_id" = String, Path, description = "ID of the user")
    ),
    responses(
        (status = 200, description = "Membership and admin flags", body = MembershipStatus)
    )
)]
async fn get_membership_status(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(GroupId, UserId)>,
) -> Result<Json<MembershipStatus>, ApiError> {
    let status = state.directory.members().status(group_id, &user_id).await?;
    Ok(Json(status))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{group_id}/members/{user_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        ("user_id" = String, Path, description = "ID of the member to remove")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 404, description = "Group, user or membership not found", body = ErrorResponse),
        (status = 409, description = "Member is the sole admin", body = ErrorResponse)
    )
)]
async fn remove_member(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(GroupId, UserId)>,
) -> Result<StatusCode, ApiError> {
    state.directory.members().remove_member(group_id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/admins/{user_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        ("user_id" = String, Path, description = "ID of the member to promote")
    ),
    responses(
        (status = 200, description = "Member is admin", body = Membership),
        (status = 404, description = "Membership not found", body = ErrorResponse)
    )
)]
async fn promote_member(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(GroupId, UserId)>,
) -> Result<Json<Membership>, ApiError> {
    let membership = state.directory.members().promote_to_admin(group_id, &user_id).await?;
    Ok(Json(membership))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{group_id}/admins/{user_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        ("user_id" = String, Path, description = "ID of the admin to demote")
    ),
    responses(
        (status = 200, description = "Member is no longer admin", body = Membership),
        (status = 404, description = "Membership not found", body = ErrorResponse),
        (status = 409, description = "Member is the sole admin", body = ErrorResponse)
    )
)]
async fn demote_member(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(GroupId, UserId)>,
) -> Result<Json<Membership>, ApiError> {
    let membership = state.directory.members().demote_from_admin(group_id, &user_id).await?;
    Ok(Json(membership))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/events",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Events of the group", body = [Event]),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
async fn list_events(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.directory.list_events(group_id).await?;
    Ok(Json(events))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/events",
    request_body = CreateEventRequest,
    params(
        ("group_id" = String, Path, description = "ID of the owning group")
    ),
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
async fn create_event(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state
        .directory
        .create_event(group_id, req.name, req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = String, Path, description = "ID of the event")
    ),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Event>, ApiError> {
    let event = state.directory.get_event(event_id).await?;
    Ok(Json(event))
}

#[utoipa::path(
    put,
    path = "/api/events/{event_id}",
    request_body = UpdateEventRequest,
    params(
        ("event_id" = String, Path, description = "ID of the event")
    ),
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let mut event = state.directory.get_event(event_id).await?;
    event.name = req.name;
    event.description = req.description;
    let updated = state.directory.update_event(event).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = String, Path, description = "ID of the event")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<StatusCode, ApiError> {
    state.directory.delete_event(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Audit trail", body = [AppLog])
    )
)]
async fn get_app_logs(State(state): State<AppState>) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = state.directory.get_app_logs().await?;
    Ok(Json(logs))
}
