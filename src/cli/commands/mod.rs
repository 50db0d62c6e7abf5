//! CLI command implementations.

pub mod refresh;
pub mod serve;
pub mod status;
pub mod validate;
pub mod verify_tide;
