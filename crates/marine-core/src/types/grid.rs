//! The canonical hourly grid and the fetch window derived from it.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Seconds per grid step.
pub const HOUR_SECS: i64 = 3600;
/// Hours per daily aggregation bucket.
pub const HOURS_PER_DAY: usize = 24;

const DAY_SECS: i64 = 86_400;

/// Where the forecast window starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowAnchor {
    /// First whole local hour at or after now
    #[default]
    NextHour,
    /// Local midnight of the current day
    LocalMidnight,
}

/// A fixed sequence of `hours` consecutive hours starting at `origin`.
///
/// Index `i` always refers to epoch second `origin + i * 3600`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyGrid {
    pub origin: i64,
    pub hours: usize,
    pub tz_offset_minutes: i32,
}

impl HourlyGrid {
    /// Anchor a grid relative to `now` (epoch seconds) in the given local offset.
    pub fn anchored(now: i64, tz_offset_minutes: i32, hours: usize, anchor: WindowAnchor) -> Self {
        let offset = i64::from(tz_offset_minutes) * 60;
        let local = now + offset;
        let local_start = match anchor {
            WindowAnchor::NextHour => {
                let floor = local.div_euclid(HOUR_SECS) * HOUR_SECS;
                if floor == local {
                    floor
                } else {
                    floor + HOUR_SECS
                }
            }
            WindowAnchor::LocalMidnight => local.div_euclid(DAY_SECS) * DAY_SECS,
        };
        Self {
            origin: local_start - offset,
            hours,
            tz_offset_minutes,
        }
    }

    /// Epoch second of grid index `i`.
    #[inline]
    pub fn epoch_at(&self, i: usize) -> i64 {
        self.origin + i as i64 * HOUR_SECS
    }

    /// All grid epochs, in order.
    pub fn epochs(&self) -> Vec<i64> {
        (0..self.hours).map(|i| self.epoch_at(i)).collect()
    }

    /// Exclusive end of the grid.
    pub fn end(&self) -> i64 {
        self.epoch_at(self.hours)
    }

    /// Maximum number of daily buckets the grid can produce.
    pub fn max_days(&self) -> usize {
        self.hours.div_ceil(HOURS_PER_DAY)
    }

    /// Local calendar day of grid index `i`, counted from the day of the
    /// first hour.
    pub fn day_index(&self, i: usize) -> usize {
        let offset = i64::from(self.tz_offset_minutes) * 60;
        let day = |epoch: i64| (epoch + offset).div_euclid(DAY_SECS);
        (day(self.epoch_at(i)) - day(self.origin)) as usize
    }

    /// Local wall-clock time of grid index `i`, formatted `YYYY-MM-DDTHH:MM`.
    pub fn local_label(&self, i: usize) -> String {
        local_label(self.epoch_at(i), self.tz_offset_minutes)
    }

    /// The window fetchers are asked to cover.
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.origin,
            end: self.end(),
            tz_offset_minutes: self.tz_offset_minutes,
        }
    }
}

/// Format an epoch second as local wall-clock time.
pub fn local_label(epoch: i64, tz_offset_minutes: i32) -> String {
    let Some(offset) = FixedOffset::east_opt(tz_offset_minutes * 60) else {
        return String::new();
    };
    DateTime::from_timestamp(epoch, 0)
        .map(|dt| dt.with_timezone(&offset).format("%Y-%m-%dT%H:%M").to_string())
        .unwrap_or_default()
}

/// Half-open interval `[start, end)` of epoch seconds handed to fetchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
    pub tz_offset_minutes: i32,
}

impl TimeWindow {
    /// Every hour in the window, as epoch seconds.
    pub fn hourly_epochs(&self) -> Vec<i64> {
        (self.start..self.end).step_by(HOUR_SECS as usize).collect()
    }

    /// UTC calendar date of the first hour.
    pub fn start_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.start, 0).map(|dt| dt.date_naive())
    }

    /// UTC calendar date of the last hour.
    pub fn end_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.end - 1, 0).map(|dt| dt.date_naive())
    }
}
