pub mod identity;
pub mod logging;
pub mod storage;
