//! Open-Meteo forecast, marine and air-quality clients.

use async_trait::async_trait;
use marine_core::error::FetchError;
use marine_core::traits::SeriesFetcher;
use marine_core::types::{
    DailyField, FieldKind, HourlyField, Location, RawSeries, Source, TimeWindow, Unit,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Which Open-Meteo API a fetcher talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Weather forecast: wind, gust, air temperature
    Forecast,
    /// Marine forecast: sea surface temperature
    Marine,
    /// Air quality forecast: dust
    AirQuality,
}

impl Endpoint {
    pub fn source(&self) -> Source {
        match self {
            Endpoint::Forecast => Source::Weather,
            Endpoint::Marine => Source::Marine,
            Endpoint::AirQuality => Source::AirQuality,
        }
    }

    /// Hourly variables requested, the field each feeds and the unit
    /// assumed when the response carries no unit for it.
    pub fn variables(&self) -> &'static [(&'static str, FieldKind, Unit)] {
        match self {
            Endpoint::Forecast => &[
                ("wind_speed_10m", FieldKind::Hourly(HourlyField::Wind), Unit::Knots),
                ("wind_direction_10m", FieldKind::Hourly(HourlyField::WindDir), Unit::Degrees),
                ("wind_gusts_10m", FieldKind::Hourly(HourlyField::Gust), Unit::Knots),
                ("temperature_2m", FieldKind::Hourly(HourlyField::Temp), Unit::Celsius),
            ],
            Endpoint::Marine => &[(
                "sea_surface_temperature",
                FieldKind::Hourly(HourlyField::SeaTemp),
                Unit::Celsius,
            )],
            Endpoint::AirQuality => &[(
                "dust",
                FieldKind::Daily(DailyField::Dust),
                Unit::MicrogramsPerCubicMeter,
            )],
        }
    }

    fn extra_params(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Endpoint::Forecast => &[("wind_speed_unit", "kn")],
            Endpoint::Marine | Endpoint::AirQuality => &[],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Endpoint::Forecast => "open-meteo-forecast",
            Endpoint::Marine => "open-meteo-marine",
            Endpoint::AirQuality => "open-meteo-air-quality",
        }
    }
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    hourly: HourlyBlock,
    #[serde(default)]
    hourly_units: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<i64>,
    #[serde(flatten)]
    columns: HashMap<String, Vec<Option<f64>>>,
}

/// Parse an Open-Meteo hourly response requested with `timeformat=unixtime`.
pub fn parse_response(endpoint: Endpoint, body: &str) -> Result<RawSeries, FetchError> {
    let mut data: HourlyResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Failure(format!("malformed response: {}", e)))?;

    let timestamps = data.hourly.time;
    let mut series = RawSeries::new(endpoint.source(), timestamps);

    for (name, field, default_unit) in endpoint.variables() {
        let values = data
            .hourly
            .columns
            .remove(*name)
            .ok_or_else(|| FetchError::Failure(format!("missing hourly variable {}", name)))?;

        if values.len() != series.len() {
            return Err(FetchError::Failure(format!(
                "{} has {} values for {} timestamps",
                name,
                values.len(),
                series.len()
            )));
        }

        let unit = data
            .hourly_units
            .get(*name)
            .and_then(|u| Unit::from_str(u).ok())
            .unwrap_or(*default_unit);

        series = series.with_field(*field, unit, values);
    }

    Ok(series)
}

/// Fetcher for one Open-Meteo endpoint.
pub struct OpenMeteoFetcher {
    endpoint: Endpoint,
    url: String,
    location: Location,
    timeout: Duration,
    client: Client,
}

impl OpenMeteoFetcher {
    /// Create a new fetcher.
    pub fn new(
        endpoint: Endpoint,
        url: String,
        location: Location,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Failure(e.to_string()))?;

        Ok(Self {
            endpoint,
            url,
            location,
            timeout,
            client,
        })
    }

    fn query(&self, window: &TimeWindow) -> Result<Vec<(&'static str, String)>, FetchError> {
        let start = window
            .start_date()
            .ok_or_else(|| FetchError::Failure("window start out of range".into()))?;
        let end = window
            .end_date()
            .ok_or_else(|| FetchError::Failure("window end out of range".into()))?;

        let hourly: Vec<&str> = self.endpoint.variables().iter().map(|(n, _, _)| *n).collect();

        let mut params = vec![
            ("latitude", self.location.latitude.to_string()),
            ("longitude", self.location.longitude.to_string()),
            ("hourly", hourly.join(",")),
            ("timezone", "GMT".to_string()),
            ("timeformat", "unixtime".to_string()),
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
        ];
        for (key, value) in self.endpoint.extra_params() {
            params.push((*key, value.to_string()));
        }
        Ok(params)
    }
}

#[async_trait]
impl SeriesFetcher for OpenMeteoFetcher {
    async fn fetch(&self, window: &TimeWindow) -> Result<RawSeries, FetchError> {
        let params = self.query(window)?;

        let resp = self
            .client
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(self.timeout)
                } else {
                    FetchError::Failure(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(FetchError::Failure(format!("{}: {}", status, text)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Failure(e.to_string()))?;

        let series = parse_response(self.endpoint, &body)?;
        debug!(
            source = %self.endpoint.source(),
            samples = series.len(),
            "Fetched upstream series"
        );
        Ok(series)
    }

    fn source(&self) -> Source {
        self.endpoint.source()
    }

    fn name(&self) -> &str {
        self.endpoint.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORECAST: &str = r#"{
        "latitude": 28.5,
        "longitude": 34.5,
        "hourly_units": {
            "time": "unixtime",
            "wind_speed_10m": "kn",
            "wind_direction_10m": "°",
            "wind_gusts_10m": "kn",
            "temperature_2m": "°C"
        },
        "hourly": {
            "time": [1769731200, 1769734800, 1769738400],
            "wind_speed_10m": [12.4, 13.6, null],
            "wind_direction_10m": [350.0, 355.0, 2.0],
            "wind_gusts_10m": [18.1, 19.9, 21.0],
            "temperature_2m": [21.4, 20.6, 20.1]
        }
    }"#;

    #[test]
    fn test_parse_forecast() {
        let series = parse_response(Endpoint::Forecast, FORECAST).unwrap();
        assert_eq!(series.source, Source::Weather);
        assert_eq!(series.len(), 3);
        assert_eq!(series.fields.len(), 4);

        let wind = series.field(FieldKind::Hourly(HourlyField::Wind)).unwrap();
        assert_eq!(wind.unit, Unit::Knots);
        assert_eq!(wind.values, vec![Some(12.4), Some(13.6), None]);

        let dir = series.field(FieldKind::Hourly(HourlyField::WindDir)).unwrap();
        assert_eq!(dir.unit, Unit::Degrees);
    }

    #[test]
    fn test_parse_uses_response_units() {
        let body = r#"{
            "hourly_units": {"sea_surface_temperature": "°F"},
            "hourly": {"time": [0, 3600], "sea_surface_temperature": [75.2, 75.0]}
        }"#;
        let series = parse_response(Endpoint::Marine, body).unwrap();
        let sst = series.field(FieldKind::Hourly(HourlyField::SeaTemp)).unwrap();
        assert_eq!(sst.unit, Unit::Fahrenheit);
    }

    #[test]
    fn test_parse_defaults_unit_when_absent() {
        let body = r#"{"hourly": {"time": [0, 3600], "dust": [12.0, null]}}"#;
        let series = parse_response(Endpoint::AirQuality, body).unwrap();
        let dust = series.field(FieldKind::Daily(DailyField::Dust)).unwrap();
        assert_eq!(dust.unit, Unit::MicrogramsPerCubicMeter);
    }

    #[test]
    fn test_parse_missing_variable() {
        let body = r#"{"hourly": {"time": [0], "wind_speed_10m": [1.0]}}"#;
        let err = parse_response(Endpoint::Forecast, body).unwrap_err();
        assert!(matches!(err, FetchError::Failure(msg) if msg.contains("wind_direction_10m")));
    }

    #[test]
    fn test_parse_length_mismatch() {
        let body = r#"{"hourly": {"time": [0, 3600], "sea_surface_temperature": [24.0]}}"#;
        assert!(parse_response(Endpoint::Marine, body).is_err());
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_response(Endpoint::Marine, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.kind(), "failure");
    }

    #[test]
    fn test_query_covers_window() {
        let fetcher = OpenMeteoFetcher::new(
            Endpoint::Forecast,
            "http://localhost/v1/forecast".into(),
            Location::new("Dahab", 28.4937, 34.5131),
            Duration::from_secs(5),
        )
        .unwrap();
        let window = TimeWindow {
            start: 1_769_734_800,
            end: 1_769_734_800 + 168 * 3600,
            tz_offset_minutes: 120,
        };
        let params = fetcher.query(&window).unwrap();
        let get = |k: &str| params.iter().find(|(key, _)| *key == k).map(|(_, v)| v.clone());
        assert_eq!(get("start_date").as_deref(), Some("2026-01-30"));
        assert_eq!(get("end_date").as_deref(), Some("2026-02-06"));
        assert_eq!(get("timeformat").as_deref(), Some("unixtime"));
        assert_eq!(get("wind_speed_unit").as_deref(), Some("kn"));
        assert_eq!(
            get("hourly").as_deref(),
            Some("wind_speed_10m,wind_direction_10m,wind_gusts_10m,temperature_2m")
        );
    }
}
