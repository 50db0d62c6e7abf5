//! Merges per-source fetch results into one snapshot.
//!
//! Every column is normalized to its field's canonical unit, aligned to the
//! canonical hourly grid, and rounded to an integer exactly once. Fields are
//! folded independently: a failed source only removes its own fields.

use marine_core::error::FetchError;
use marine_core::types::{
    DailyField, FieldKind, FieldSeries, HourlyField, HourlyGrid, RawSeries, Snapshot, Source,
    HOUR_SECS,
};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Minimum alignment tolerance, seconds.
const MIN_TOLERANCE_SECS: i64 = HOUR_SECS / 2;

/// The outcome of one fetcher.
#[derive(Debug, Clone)]
pub struct SourceResult {
    pub source: Source,
    pub outcome: Result<RawSeries, FetchError>,
}

impl SourceResult {
    pub fn ok(series: RawSeries) -> Self {
        Self {
            source: series.source,
            outcome: Ok(series),
        }
    }

    pub fn failed(source: Source, error: FetchError) -> Self {
        Self {
            source,
            outcome: Err(error),
        }
    }
}

/// A source that contributed nothing this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub source: Source,
    pub error: FetchError,
}

/// What the refresh cycle should do with the merge result.
#[derive(Debug, Clone)]
pub enum MergeDecision {
    /// At least one field is usable; replace the cached snapshot.
    Commit {
        snapshot: Snapshot,
        failures: Vec<SourceFailure>,
    },
    /// Nothing usable; keep serving the previous snapshot.
    KeepPrevious { failures: Vec<SourceFailure> },
}

impl MergeDecision {
    pub fn failures(&self) -> &[SourceFailure] {
        match self {
            MergeDecision::Commit { failures, .. } | MergeDecision::KeepPrevious { failures } => {
                failures
            }
        }
    }
}

/// Aligns heterogeneous series onto one hourly grid.
#[derive(Debug, Clone, Copy)]
pub struct SeriesMerger {
    grid: HourlyGrid,
}

impl SeriesMerger {
    pub fn new(grid: HourlyGrid) -> Self {
        Self { grid }
    }

    /// Merge fetch results into a new snapshot produced at `fetched_at`.
    ///
    /// `previous` is only consulted to report fields that disappeared; its
    /// values are never carried into the new snapshot.
    pub fn merge(
        &self,
        mut results: Vec<SourceResult>,
        previous: Option<&Snapshot>,
        fetched_at: i64,
    ) -> MergeDecision {
        results.sort_by_key(|r| r.source);

        let mut snapshot = Snapshot::new(&self.grid, fetched_at);
        let mut failures = Vec::new();

        for result in results {
            let series = match result.outcome {
                Ok(series) => series,
                Err(error) => {
                    warn!(
                        source = %result.source,
                        kind = error.kind(),
                        %error,
                        "Source unavailable this cycle"
                    );
                    failures.push(SourceFailure {
                        source: result.source,
                        error,
                    });
                    continue;
                }
            };

            let step = series.native_step();
            for column in &series.fields {
                self.fold_column(&mut snapshot, &series, column, step);
            }
        }

        if snapshot.is_empty() {
            return MergeDecision::KeepPrevious { failures };
        }

        if let Err(e) = snapshot.validate() {
            warn!(error = %e, "Merged snapshot failed validation");
            return MergeDecision::KeepPrevious { failures };
        }

        if let Some(previous) = previous {
            let now: BTreeSet<_> = snapshot.field_names().into_iter().collect();
            for name in previous.field_names() {
                if !now.contains(name) {
                    warn!(field = name, "Field dropped from snapshot");
                }
            }
        }

        MergeDecision::Commit { snapshot, failures }
    }

    fn fold_column(
        &self,
        snapshot: &mut Snapshot,
        series: &RawSeries,
        column: &FieldSeries,
        step: Option<i64>,
    ) {
        let target = match column.field {
            FieldKind::Hourly(field) => field.canonical_unit(),
            FieldKind::Daily(field) => field.canonical_unit(),
        };

        let mut normalized = Vec::with_capacity(column.values.len());
        for value in &column.values {
            let converted = match value {
                Some(v) if v.is_finite() => match column.unit.convert(*v, target) {
                    Some(c) => Some(c),
                    None => {
                        warn!(
                            source = %series.source,
                            field = %column.field,
                            unit = %column.unit,
                            "Unit cannot be converted, dropping column"
                        );
                        return;
                    }
                },
                _ => None,
            };
            normalized.push(converted);
        }

        let aligned = resample(&series.timestamps, &normalized, step, &self.grid);

        match column.field {
            FieldKind::Hourly(field) => {
                self.fold_hourly(snapshot, series.source, field, &aligned)
            }
            FieldKind::Daily(field) => self.fold_daily(snapshot, series.source, field, &aligned),
        }
    }

    fn fold_hourly(
        &self,
        snapshot: &mut Snapshot,
        source: Source,
        field: HourlyField,
        aligned: &[Option<f64>],
    ) {
        if snapshot.hourly_series.contains_key(&field) {
            debug!(%source, %field, "Field already provided by a higher-priority source");
            return;
        }
        match fill_gaps(aligned) {
            Some(filled) => {
                let values = filled.into_iter().map(round_half_away).collect();
                snapshot.hourly_series.insert(field, values);
            }
            None => warn!(%source, %field, "No samples inside the forecast window"),
        }
    }

    fn fold_daily(
        &self,
        snapshot: &mut Snapshot,
        source: Source,
        field: DailyField,
        aligned: &[Option<f64>],
    ) {
        if snapshot.daily_series.contains_key(&field) {
            return;
        }
        let daily = daily_max(aligned, &self.grid);
        if daily.is_empty() {
            warn!(%source, %field, "No samples inside the forecast window");
        } else {
            snapshot.daily_series.insert(field, daily);
        }
    }
}

/// Align samples to the grid by nearest timestamp.
///
/// A grid hour takes the value of the closest non-empty sample lying within
/// half the native step (at least 30 minutes); ties go to the earlier
/// sample. Hours with no such sample are `None`.
pub fn resample(
    timestamps: &[i64],
    values: &[Option<f64>],
    native_step: Option<i64>,
    grid: &HourlyGrid,
) -> Vec<Option<f64>> {
    let tolerance = native_step
        .map(|s| s / 2)
        .unwrap_or(0)
        .max(MIN_TOLERANCE_SECS);

    let mut samples: Vec<(i64, f64)> = timestamps
        .iter()
        .zip(values)
        .filter_map(|(t, v)| v.map(|v| (*t, v)))
        .collect();
    samples.sort_by_key(|(t, _)| *t);

    (0..grid.hours)
        .map(|i| {
            let t = grid.epoch_at(i);
            let idx = samples.partition_point(|(ts, _)| *ts < t);
            let before = idx.checked_sub(1).map(|j| samples[j]);
            let after = samples.get(idx).copied();
            let nearest = match (before, after) {
                (Some(b), Some(a)) => {
                    if t - b.0 <= a.0 - t {
                        Some(b)
                    } else {
                        Some(a)
                    }
                }
                (Some(b), None) => Some(b),
                (None, Some(a)) => Some(a),
                (None, None) => None,
            };
            nearest
                .filter(|(ts, _)| (ts - t).abs() <= tolerance)
                .map(|(_, v)| v)
        })
        .collect()
}

/// Fill gaps: leading gaps take the first value, later gaps repeat the
/// last value. `None` when there is no value at all.
pub fn fill_gaps(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let first = values.iter().flatten().next().copied()?;
    let mut last = first;
    Some(
        values
            .iter()
            .map(|v| {
                if let Some(v) = v {
                    last = *v;
                }
                last
            })
            .collect(),
    )
}

/// Maximum of each local calendar day of `grid`, rounded.
///
/// Buckets split at local midnight, so a window starting mid-morning has a
/// short first day. Partial first and last days still yield an entry. The
/// series holds at most `grid.max_days()` entries and ends at the first day
/// without any value.
pub fn daily_max(values: &[Option<f64>], grid: &HourlyGrid) -> Vec<i32> {
    let mut maxima: Vec<Option<f64>> = vec![None; grid.max_days()];
    for (i, value) in values.iter().enumerate() {
        let (Some(v), Some(slot)) = (value, maxima.get_mut(grid.day_index(i))) else {
            continue;
        };
        *slot = Some(slot.map_or(*v, |m| m.max(*v)));
    }
    maxima
        .into_iter()
        .map_while(|max| max.map(round_half_away))
        .collect()
}

/// Round to the nearest integer, halves away from zero.
#[inline]
pub fn round_half_away(value: f64) -> i32 {
    value.round() as i32
}
