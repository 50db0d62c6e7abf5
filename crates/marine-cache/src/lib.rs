//! Snapshot cache for the marine forecast.
//!
//! The store owns the live snapshot. Reads are lock-free and never touch
//! the disk; commits swap the in-memory snapshot and then mirror it to a
//! single JSON record with a write-then-rename.

mod persist;
mod staleness;
mod store;

pub use persist::{read_record, remove_stale_temps, write_record};
pub use staleness::{HealthReport, HealthStatus, StalenessPolicy};
pub use store::{CacheStore, CacheView};
