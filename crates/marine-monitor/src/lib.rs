//! Logging setup and status reporting.

mod logging;
mod status;

pub use logging::setup_logging;
pub use status::{FieldSummary, StatusReport};
