//! Field names, upstream sources and measurement units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hourly forecast fields. The serialized names are the keys of the
/// compact read schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourlyField {
    /// Wind speed, knots
    Wind,
    /// Wind direction, degrees
    WindDir,
    /// Wind gust, knots
    Gust,
    /// Air temperature, whole degrees Celsius
    Temp,
    /// Sea surface temperature, whole degrees Celsius
    SeaTemp,
    /// Tide height above chart datum, centimetres
    Tide,
}

impl HourlyField {
    /// Unit the field is stored in after normalization.
    pub fn canonical_unit(&self) -> Unit {
        match self {
            HourlyField::Wind | HourlyField::Gust => Unit::Knots,
            HourlyField::WindDir => Unit::Degrees,
            HourlyField::Temp | HourlyField::SeaTemp => Unit::Celsius,
            HourlyField::Tide => Unit::Centimeters,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HourlyField::Wind => "wind",
            HourlyField::WindDir => "wind_dir",
            HourlyField::Gust => "gust",
            HourlyField::Temp => "temp",
            HourlyField::SeaTemp => "sea_temp",
            HourlyField::Tide => "tide",
        }
    }
}

impl fmt::Display for HourlyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily aggregated fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyField {
    /// Maximum dust concentration per day, µg/m³
    Dust,
}

impl DailyField {
    pub fn canonical_unit(&self) -> Unit {
        match self {
            DailyField::Dust => Unit::MicrogramsPerCubicMeter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DailyField::Dust => "dust",
        }
    }
}

impl fmt::Display for DailyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any field an upstream series may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Hourly(HourlyField),
    Daily(DailyField),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Hourly(h) => h.fmt(f),
            FieldKind::Daily(d) => d.fmt(f),
        }
    }
}

/// Upstream data sources, in merge priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Weather,
    Marine,
    AirQuality,
    Tide,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Source::Weather => "weather",
            Source::Marine => "marine",
            Source::AirQuality => "air_quality",
            Source::Tide => "tide",
        };
        f.write_str(s)
    }
}

/// Measurement unit attached to an upstream series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Knots,
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
    Degrees,
    Celsius,
    Fahrenheit,
    Kelvin,
    Meters,
    Centimeters,
    Millimeters,
    MicrogramsPerCubicMeter,
}

impl Unit {
    /// Convert `value` from this unit into `target`.
    ///
    /// Returns `None` when the two units measure different quantities.
    pub fn convert(self, value: f64, target: Unit) -> Option<f64> {
        use Unit::*;
        if self == target {
            return Some(value);
        }
        let converted = match (self, target) {
            (MetersPerSecond, Knots) => value * 1.943_844,
            (KilometersPerHour, Knots) => value * 0.539_957,
            (MilesPerHour, Knots) => value * 0.868_976,
            (Knots, MetersPerSecond) => value / 1.943_844,
            (Fahrenheit, Celsius) => (value - 32.0) * 5.0 / 9.0,
            (Kelvin, Celsius) => value - 273.15,
            (Meters, Centimeters) => value * 100.0,
            (Millimeters, Centimeters) => value / 10.0,
            (Centimeters, Meters) => value / 100.0,
            _ => return None,
        };
        Some(converted)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Knots => "kn",
            Unit::MetersPerSecond => "m/s",
            Unit::KilometersPerHour => "km/h",
            Unit::MilesPerHour => "mp/h",
            Unit::Degrees => "°",
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
            Unit::Kelvin => "K",
            Unit::Meters => "m",
            Unit::Centimeters => "cm",
            Unit::Millimeters => "mm",
            Unit::MicrogramsPerCubicMeter => "μg/m³",
        };
        f.write_str(s)
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "kn" | "kt" | "knots" => Ok(Unit::Knots),
            "m/s" | "ms" => Ok(Unit::MetersPerSecond),
            "km/h" | "kmh" => Ok(Unit::KilometersPerHour),
            "mp/h" | "mph" => Ok(Unit::MilesPerHour),
            "°" | "deg" | "degrees" => Ok(Unit::Degrees),
            "°C" | "C" | "celsius" => Ok(Unit::Celsius),
            "°F" | "F" | "fahrenheit" => Ok(Unit::Fahrenheit),
            "K" | "kelvin" => Ok(Unit::Kelvin),
            "m" => Ok(Unit::Meters),
            "cm" => Ok(Unit::Centimeters),
            "mm" => Ok(Unit::Millimeters),
            "μg/m³" | "µg/m³" | "ug/m3" => Ok(Unit::MicrogramsPerCubicMeter),
            other => Err(format!("Unknown unit: {}", other)),
        }
    }
}
