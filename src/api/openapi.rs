use utoipa::OpenApi;

use crate::{
    api::models::{
        AddMemberRequest, CreateEventRequest, CreateGroupRequest, ErrorResponse, UpdateEventRequest,
        UpdateGroupRequest, UpsertUserRequest,
    },
    core::models::{
        AppLog, Event, EventId, Group, GroupDetails, GroupId, GroupMember, Membership, MembershipStatus, User, UserId,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::upsert_user,
        super::handlers::delete_user,
        super::handlers::list_user_groups,
        super::handlers::create_group,
        super::handlers::get_group,
        super::handlers::update_group,
        super::handlers::delete_group,
        super::handlers::list_members,
        super::handlers::add_member,
        super::handlers::get_membership_status,
        super::handlers::remove_member,
        super::handlers::promote_member,
        super::handlers::demote_member,
        super::handlers::list_events,
        super::handlers::create_event,
        super::handlers::get_event,
        super::handlers::update_event,
        super::handlers::delete_event,
        super::handlers::get_app_logs
    ),
    components(schemas(
        UpsertUserRequest,
        CreateGroupRequest,
        UpdateGroupRequest,
        AddMemberRequest,
        CreateEventRequest,
        UpdateEventRequest,
        ErrorResponse,
        GroupId,
        EventId,
        UserId,
        User,
        Group,
        GroupMember,
        GroupDetails,
        Membership,
        MembershipStatus,
        Event,
        AppLog
    )),
    info(
        title = "Gifter API",
        description = "API for managing gift-exchange groups, their members and events",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
