//! Core data types for the marine forecast cache.

mod field;
mod grid;
mod location;
mod series;
mod snapshot;

pub use field::{DailyField, FieldKind, HourlyField, Source, Unit};
pub use grid::{local_label, HourlyGrid, TimeWindow, WindowAnchor, HOURS_PER_DAY, HOUR_SECS};
pub use location::Location;
pub use series::{FieldSeries, RawSeries};
pub use snapshot::{CacheRecord, Snapshot, SCHEMA_VERSION};

/// Current wall-clock time as epoch seconds.
pub fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}
