pub mod audit;
pub mod event;
pub mod group;
pub mod ids;
pub mod membership;
pub mod user;

pub use audit::AppLog;
pub use event::Event;
pub use group::{Group, GroupDetails, GroupMember};
pub use ids::{EventId, GroupId, UserId};
pub use membership::{Membership, MembershipStatus};
pub use user::User;
