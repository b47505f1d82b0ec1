pub mod api;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::{ErrorKind, GifterError};
pub use crate::core::services::{GroupDirectory, MembershipEngine};
pub use crate::infrastructure::identity::in_memory::InMemoryIdentity;
pub use crate::infrastructure::logging::in_memory::InMemoryLogging;
pub use crate::infrastructure::storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests;
