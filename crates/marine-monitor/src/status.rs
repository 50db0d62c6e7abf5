//! Plain-text status report for the persisted cache.

use marine_cache::HealthReport;
use marine_core::types::{local_label, Snapshot};
use serde::Serialize;
use std::fmt;

/// Range summary of one series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub name: &'static str,
    pub len: usize,
    pub min: i32,
    pub max: i32,
    pub first: i32,
}

impl FieldSummary {
    fn of(name: &'static str, values: &[i32]) -> Option<Self> {
        Some(Self {
            name,
            len: values.len(),
            min: *values.iter().min()?,
            max: *values.iter().max()?,
            first: *values.first()?,
        })
    }
}

/// Health plus a per-field overview of the served snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub health: HealthReport,
    pub window_start: Option<String>,
    pub hours: usize,
    pub fields: Vec<FieldSummary>,
}

impl StatusReport {
    pub fn new(health: HealthReport, snapshot: Option<&Snapshot>) -> Self {
        let Some(snapshot) = snapshot else {
            return Self {
                health,
                window_start: None,
                hours: 0,
                fields: Vec::new(),
            };
        };

        let hourly = snapshot
            .hourly_series
            .iter()
            .filter_map(|(field, values)| FieldSummary::of(field.as_str(), values));
        let daily = snapshot
            .daily_series
            .iter()
            .filter_map(|(field, values)| FieldSummary::of(field.as_str(), values));

        Self {
            health,
            window_start: Some(local_label(
                snapshot.origin_timestamp,
                snapshot.timezone_offset_minutes,
            )),
            hours: snapshot.hours,
            fields: hourly.chain(daily).collect(),
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "has data:       {}", self.health.has_data)?;
        match self.health.cache_age_seconds {
            Some(age) => writeln!(f, "cache age:      {}s", age)?,
            None => writeln!(f, "cache age:      -")?,
        }
        writeln!(f, "needs refresh:  {}", self.health.needs_refresh)?;

        if let Some(start) = &self.window_start {
            writeln!(f, "window:         {} (+{}h)", start, self.hours)?;
            writeln!(f)?;
            writeln!(f, "{:<12} {:>5} {:>6} {:>6} {:>6}", "field", "len", "first", "min", "max")?;
            for s in &self.fields {
                writeln!(
                    f,
                    "{:<12} {:>5} {:>6} {:>6} {:>6}",
                    s.name, s.len, s.first, s.min, s.max
                )?;
            }
        }
        Ok(())
    }
}
