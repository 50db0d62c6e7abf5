//! Raw upstream series as returned by fetchers.

use serde::{Deserialize, Serialize};

use super::{FieldKind, Source, Unit};

/// One unit-tagged value column of a raw series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSeries {
    pub field: FieldKind,
    pub unit: Unit,
    /// One value per timestamp of the owning series; `None` is a gap.
    pub values: Vec<Option<f64>>,
}

/// A time-indexed series from a single upstream source.
///
/// Timestamps are epoch seconds in ascending order and may use any
/// native resolution. Normalization and resampling are the merger's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub source: Source,
    pub timestamps: Vec<i64>,
    pub fields: Vec<FieldSeries>,
}

impl RawSeries {
    /// Create an empty series for a source.
    pub fn new(source: Source, timestamps: Vec<i64>) -> Self {
        Self {
            source,
            timestamps,
            fields: Vec::new(),
        }
    }

    /// Add a value column.
    pub fn with_field(mut self, field: FieldKind, unit: Unit, values: Vec<Option<f64>>) -> Self {
        self.fields.push(FieldSeries {
            field,
            unit,
            values,
        });
        self
    }

    /// Get the column for a field.
    pub fn field(&self, field: FieldKind) -> Option<&FieldSeries> {
        self.fields.iter().find(|f| f.field == field)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Median spacing between consecutive timestamps, in seconds.
    pub fn native_step(&self) -> Option<i64> {
        if self.timestamps.len() < 2 {
            return None;
        }
        let mut steps: Vec<i64> = self
            .timestamps
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|d| *d > 0)
            .collect();
        if steps.is_empty() {
            return None;
        }
        steps.sort_unstable();
        Some(steps[steps.len() / 2])
    }
}
