//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, ForecastSettings, LocationSettings, LoggingConfig, RefreshSettings,
    ServerSettings, StorageSettings, TideSettings, UpstreamSettings, ValidationError,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// Environment variables use the `MARINE` prefix and `__` as the section
/// separator, e.g. `MARINE__REFRESH__INTERVAL_SECS=600`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("MARINE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use marine_core::types::WindowAnchor;
    use std::io::Write;

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[location]
name = "Nuweiba"
latitude = 29.03
longitude = 34.66

[forecast]
hours = 72
anchor = "local_midnight"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.location.name, "Nuweiba");
        assert_eq!(config.forecast.hours, 72);
        assert_eq!(config.forecast.anchor, WindowAnchor::LocalMidnight);
        assert_eq!(config.forecast.tz_offset_minutes, 120);
        assert_eq!(config.refresh.interval_secs, 1800);
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_default_file_round_trips() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(AppConfig::default().to_toml().unwrap().as_bytes())
            .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.refresh.fetch_timeout_secs, 30);
        assert_eq!(config.storage.cache_path, "data/cache.json");
        assert_eq!(config.tide.datum_offset_cm, 45);
    }
}
