//! Configuration structures.

use marine_core::types::{Location, WindowAnchor};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Longest forecast horizon the upstream APIs serve, in hours.
const MAX_HOURS: usize = 384;
/// Largest real-world UTC offset, in minutes.
const MAX_TZ_OFFSET_MINUTES: i32 = 14 * 60;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub location: LocationSettings,
    #[serde(default)]
    pub forecast: ForecastSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub tide: TideSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// A setting that is out of range.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("forecast.hours must be between 1 and {max}, got {got}")]
    Hours { got: usize, max: usize },

    #[error("refresh.interval_secs must be positive")]
    ZeroInterval,

    #[error("fetch_timeout_secs must be positive and below interval_secs ({interval}), got {got}")]
    FetchTimeout { got: u64, interval: u64 },

    #[error("forecast.tz_offset_minutes must be within ±{max}, got {got}")]
    TzOffset { got: i32, max: i32 },

    #[error("location {latitude},{longitude} is out of range")]
    Location { latitude: f64, longitude: f64 },
}

impl AppConfig {
    /// Check cross-field constraints the types cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.forecast.hours == 0 || self.forecast.hours > MAX_HOURS {
            return Err(ValidationError::Hours {
                got: self.forecast.hours,
                max: MAX_HOURS,
            });
        }
        if self.refresh.interval_secs == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        if self.refresh.fetch_timeout_secs == 0
            || self.refresh.fetch_timeout_secs >= self.refresh.interval_secs
        {
            return Err(ValidationError::FetchTimeout {
                got: self.refresh.fetch_timeout_secs,
                interval: self.refresh.interval_secs,
            });
        }
        if self.forecast.tz_offset_minutes.abs() > MAX_TZ_OFFSET_MINUTES {
            return Err(ValidationError::TzOffset {
                got: self.forecast.tz_offset_minutes,
                max: MAX_TZ_OFFSET_MINUTES,
            });
        }
        if !self.location.to_location().is_valid() {
            return Err(ValidationError::Location {
                latitude: self.location.latitude,
                longitude: self.location.longitude,
            });
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "marine-conditions".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// The spot the forecast is built for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSettings {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            name: "Dahab".to_string(),
            latitude: 28.4937,
            longitude: 34.5131,
        }
    }
}

impl LocationSettings {
    pub fn to_location(&self) -> Location {
        Location::new(self.name.clone(), self.latitude, self.longitude)
    }
}

/// Forecast window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub hours: usize,
    pub tz_offset_minutes: i32,
    pub anchor: WindowAnchor,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            hours: 168,
            tz_offset_minutes: 120,
            anchor: WindowAnchor::NextHour,
        }
    }
}

/// Refresh timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    pub interval_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: 1800,
            fetch_timeout_secs: 30,
        }
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Where the cache record lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub cache_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            cache_path: "data/cache.json".to_string(),
        }
    }
}

/// Open-Meteo endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    pub weather_url: String,
    pub marine_url: String,
    pub air_quality_url: String,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            weather_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            marine_url: "https://marine-api.open-meteo.com/v1/marine".to_string(),
            air_quality_url: "https://air-quality-api.open-meteo.com/v1/air-quality".to_string(),
        }
    }
}

/// Harmonic tide model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TideSettings {
    pub enabled: bool,
    pub constants_path: String,
    /// Added to every predicted height, in centimetres
    pub datum_offset_cm: i32,
}

impl Default for TideSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            constants_path: "tide-models/FES2022/constants.json".to_string(),
            datum_offset_cm: 45,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}
