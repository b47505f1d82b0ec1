// Operation names, used both as audit actions and as the `operation` span field.
pub const GROUP_CREATED: &str = "GROUP_CREATED";
pub const GROUP_UPDATED: &str = "GROUP_UPDATED";
pub const GROUP_DELETED: &str = "GROUP_DELETED";
pub const MEMBER_ADDED: &str = "MEMBER_ADDED";
pub const MEMBER_REMOVED: &str = "MEMBER_REMOVED";
pub const MEMBER_PROMOTED: &str = "MEMBER_PROMOTED";
pub const MEMBER_DEMOTED: &str = "MEMBER_DEMOTED";
pub const USER_FORGOTTEN: &str = "USER_FORGOTTEN";
pub const EVENT_CREATED: &str = "EVENT_CREATED";
pub const EVENT_UPDATED: &str = "EVENT_UPDATED";
pub const EVENT_DELETED: &str = "EVENT_DELETED";

// Read-only operations; traced but never audited.
pub const GROUP_QUERIED: &str = "GROUP_QUERIED";
pub const GROUP_EXISTS_CHECKED: &str = "GROUP_EXISTS_CHECKED";
pub const MEMBERSHIP_CHECKED: &str = "MEMBERSHIP_CHECKED";
pub const ADMIN_CHECKED: &str = "ADMIN_CHECKED";
pub const MEMBERS_LISTED: &str = "MEMBERS_LISTED";
pub const USER_GROUPS_LISTED: &str = "USER_GROUPS_LISTED";
pub const EVENT_QUERIED: &str = "EVENT_QUERIED";
pub const EVENTS_LISTED: &str = "EVENTS_LISTED";

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
