//! Upstream data sources for the marine forecast cache.

mod open_meteo;
mod tide;

pub use open_meteo::{parse_response, Endpoint, OpenMeteoFetcher};
pub use tide::{HarmonicConstants, HarmonicTideModel, TideFetcher, TideReadiness};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use marine_core::error::MarineResult;
use marine_core::traits::SeriesFetcher;
use marine_core::types::Location;

/// Upstream endpoints for the three Open-Meteo fetchers.
#[derive(Debug, Clone)]
pub struct UpstreamUrls {
    pub weather: String,
    pub marine: String,
    pub air_quality: String,
}

/// Build the Open-Meteo fetchers in merge priority order.
pub fn open_meteo_fetchers(
    urls: &UpstreamUrls,
    location: &Location,
    timeout: Duration,
) -> MarineResult<Vec<Arc<dyn SeriesFetcher>>> {
    let endpoints = [
        (Endpoint::Forecast, &urls.weather),
        (Endpoint::Marine, &urls.marine),
        (Endpoint::AirQuality, &urls.air_quality),
    ];
    let mut fetchers: Vec<Arc<dyn SeriesFetcher>> = Vec::with_capacity(endpoints.len());
    for (endpoint, url) in endpoints {
        fetchers.push(Arc::new(OpenMeteoFetcher::new(
            endpoint,
            url.clone(),
            location.clone(),
            timeout,
        )?));
    }
    Ok(fetchers)
}

/// Load the harmonic tide model and wrap it as a fetcher.
pub fn load_tide_fetcher(
    constants_path: &Path,
    location: &Location,
    datum_offset_cm: i32,
) -> MarineResult<TideFetcher<HarmonicTideModel>> {
    let model = HarmonicTideModel::from_file(constants_path, datum_offset_cm)?;
    Ok(TideFetcher::new(Arc::new(model), location.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marine_core::error::MarineError;
    use marine_core::types::Source;

    fn urls() -> UpstreamUrls {
        UpstreamUrls {
            weather: "http://127.0.0.1:1/v1/forecast".into(),
            marine: "http://127.0.0.1:1/v1/marine".into(),
            air_quality: "http://127.0.0.1:1/v1/air-quality".into(),
        }
    }

    #[test]
    fn test_open_meteo_fetchers_in_priority_order() {
        let location = Location::new("Dahab", 28.4937, 34.5131);
        let fetchers = open_meteo_fetchers(&urls(), &location, Duration::from_secs(5)).unwrap();
        let sources: Vec<Source> = fetchers.iter().map(|f| f.source()).collect();
        assert_eq!(sources, vec![Source::Weather, Source::Marine, Source::AirQuality]);
    }

    #[test]
    fn test_load_tide_fetcher_missing_constants() {
        let location = Location::new("Dahab", 28.4937, 34.5131);
        let err = load_tide_fetcher(Path::new("/nonexistent/tide.json"), &location, 0)
            .err()
            .unwrap();
        assert!(matches!(err, MarineError::Io(_)));
    }
}
