//! Compact response schema.

use marine_core::types::{DailyField, HourlyField, Snapshot};
use serde::{Deserialize, Serialize};

/// The snapshot as served to clients.
///
/// `time[i]` is the local wall-clock label of hour `i`; `ts` is the epoch
/// second of hour 0. Series missing from the snapshot are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionsResponse {
    pub ts: i64,
    pub tz_offset: i32,
    pub time: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_dir: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gust: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dust_daily: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sea_temp: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tide: Option<Vec<i32>>,
    /// Seconds since the snapshot was produced
    pub age: i64,
}

impl ConditionsResponse {
    pub fn from_snapshot(snapshot: &Snapshot, age: i64) -> Self {
        let hourly = |field| snapshot.hourly(field).map(<[i32]>::to_vec);
        let grid = snapshot.grid();
        Self {
            ts: snapshot.origin_timestamp,
            tz_offset: snapshot.timezone_offset_minutes,
            time: (0..grid.hours).map(|i| grid.local_label(i)).collect(),
            wind: hourly(HourlyField::Wind),
            wind_dir: hourly(HourlyField::WindDir),
            gust: hourly(HourlyField::Gust),
            temp: hourly(HourlyField::Temp),
            dust_daily: snapshot.daily(DailyField::Dust).map(<[i32]>::to_vec),
            sea_temp: hourly(HourlyField::SeaTemp),
            tide: hourly(HourlyField::Tide),
            age,
        }
    }
}
