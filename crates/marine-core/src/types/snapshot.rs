//! The cached forecast snapshot and its persisted record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{DailyField, HourlyField, HourlyGrid};
use crate::error::SnapshotError;

/// Version of the persisted cache record layout.
pub const SCHEMA_VERSION: u32 = 1;

/// One complete, internally consistent forecast produced by a refresh cycle.
///
/// Values are integers in each field's canonical unit. Every present hourly
/// field has exactly `hours` entries aligned to `origin_timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Epoch seconds of the first forecast hour
    pub origin_timestamp: i64,
    /// Local offset from UTC, minutes
    pub timezone_offset_minutes: i32,
    /// Length of every hourly field
    pub hours: usize,
    #[serde(default)]
    pub hourly_series: BTreeMap<HourlyField, Vec<i32>>,
    #[serde(default)]
    pub daily_series: BTreeMap<DailyField, Vec<i32>>,
    /// Epoch seconds when this snapshot was produced
    pub fetched_at: i64,
}

impl Snapshot {
    /// Create an empty snapshot on a grid.
    pub fn new(grid: &HourlyGrid, fetched_at: i64) -> Self {
        Self {
            origin_timestamp: grid.origin,
            timezone_offset_minutes: grid.tz_offset_minutes,
            hours: grid.hours,
            hourly_series: BTreeMap::new(),
            daily_series: BTreeMap::new(),
            fetched_at,
        }
    }

    /// The grid this snapshot is aligned to.
    pub fn grid(&self) -> HourlyGrid {
        HourlyGrid {
            origin: self.origin_timestamp,
            hours: self.hours,
            tz_offset_minutes: self.timezone_offset_minutes,
        }
    }

    pub fn hourly(&self, field: HourlyField) -> Option<&[i32]> {
        self.hourly_series.get(&field).map(Vec::as_slice)
    }

    pub fn daily(&self, field: DailyField) -> Option<&[i32]> {
        self.daily_series.get(&field).map(Vec::as_slice)
    }

    /// True when no field carries any value.
    pub fn is_empty(&self) -> bool {
        self.hourly_series.values().all(Vec::is_empty)
            && self.daily_series.values().all(Vec::is_empty)
    }

    /// Seconds elapsed since the snapshot was produced, never negative.
    pub fn age_at(&self, now: i64) -> i64 {
        (now - self.fetched_at).max(0)
    }

    /// Names of the present fields, hourly first.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.hourly_series
            .keys()
            .map(HourlyField::as_str)
            .chain(self.daily_series.keys().map(DailyField::as_str))
            .collect()
    }

    /// Check the length and alignment invariants.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.is_empty() {
            return Err(SnapshotError::Empty);
        }
        for (field, values) in &self.hourly_series {
            if values.len() != self.hours {
                return Err(SnapshotError::HourlyLength {
                    field: field.to_string(),
                    expected: self.hours,
                    actual: values.len(),
                });
            }
        }
        let max = self.grid().max_days();
        for (field, values) in &self.daily_series {
            if values.len() > max {
                return Err(SnapshotError::DailyLength {
                    field: field.to_string(),
                    max,
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }
}

/// Persisted form of the cache: exactly one snapshot plus a schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub schema_version: u32,
    pub snapshot: Snapshot,
}

impl CacheRecord {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            snapshot,
        }
    }
}
