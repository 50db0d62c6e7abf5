//! Snapshot age and the refresh health signal.

use marine_core::types::Snapshot;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Overall service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// A snapshot is being served
    Ok,
    /// No snapshot has been committed or loaded yet
    WarmingUp,
}

/// Health endpoint payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub has_data: bool,
    pub cache_age_seconds: Option<i64>,
    pub needs_refresh: bool,
}

/// Computes snapshot age and whether it has outlived the refresh interval.
///
/// This never gates serving. Stale data is always served with its age.
#[derive(Debug, Clone, Copy)]
pub struct StalenessPolicy {
    refresh_interval: Duration,
}

impl StalenessPolicy {
    pub fn new(refresh_interval: Duration) -> Self {
        Self { refresh_interval }
    }

    /// Seconds since `fetched_at`.
    pub fn age(&self, fetched_at: i64, now: i64) -> i64 {
        (now - fetched_at).max(0)
    }

    /// True when `age` exceeds the refresh interval, or there is no data.
    pub fn needs_refresh(&self, age: Option<i64>) -> bool {
        match age {
            Some(age) => age > self.refresh_interval.as_secs() as i64,
            None => true,
        }
    }

    /// Build the health report for the current snapshot.
    pub fn health(&self, snapshot: Option<&Snapshot>, now: i64) -> HealthReport {
        let age = snapshot.map(|s| self.age(s.fetched_at, now));
        HealthReport {
            status: if snapshot.is_some() {
                HealthStatus::Ok
            } else {
                HealthStatus::WarmingUp
            },
            has_data: snapshot.is_some(),
            cache_age_seconds: age,
            needs_refresh: self.needs_refresh(age),
        }
    }
}
