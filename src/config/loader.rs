//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading reference data
//! and default settings from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::Settings;

use super::types::{AirportsConfig, JurisdictionMetadata, RateConfig, ReferenceTables};

/// Loads and provides access to reference data.
///
/// The `ConfigLoader` reads YAML configuration files from a directory and
/// exposes them as [`ReferenceTables`] plus the default [`Settings`].
///
/// # Directory Structure
///
/// ```text
/// config/de/
/// ├── jurisdiction.yaml   # Jurisdiction metadata and home country
/// ├── airports.yaml       # IATA code -> country, city, timezone
/// ├── defaults.yaml       # Default settings (optional)
/// └── rates/
///     └── 2024-01-01.yaml # Per-diem and commute rates effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use crew_tax_engine::config::{ConfigLoader, ReferenceData};
///
/// let loader = ConfigLoader::load("./config/de").unwrap();
/// assert_eq!(loader.tables().country_of("JFK"), "US");
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    tables: ReferenceTables,
    defaults: Settings,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/de")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The rates directory holds no rate files
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<JurisdictionMetadata>(&path.join("jurisdiction.yaml"))?;
        let airports = Self::load_yaml::<AirportsConfig>(&path.join("airports.yaml"))?;
        let rates = Self::load_rates(&path.join("rates"))?;

        let defaults_path = path.join("defaults.yaml");
        let defaults = if defaults_path.exists() {
            Self::load_yaml::<Settings>(&defaults_path)?
        } else {
            Settings::default()
        };

        tracing::debug!(
            jurisdiction = %metadata.code,
            airports = airports.airports.len(),
            rate_periods = rates.len(),
            "Loaded reference data"
        );

        Ok(Self {
            tables: ReferenceTables::new(metadata, airports.airports, rates),
            defaults,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RateConfig>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                rates.push(Self::load_yaml::<RateConfig>(&path)?);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the loaded reference tables.
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Returns the default settings.
    pub fn default_settings(&self) -> &Settings {
        &self.defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReferenceData;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/de"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.tables().jurisdiction().code, "DE");
        assert_eq!(loader.tables().home_country(), "DE");
    }

    #[test]
    fn test_airport_lookup() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let jfk = loader.tables().airport("JFK").unwrap();
        assert_eq!(jfk.country, "US");
        assert_eq!(jfk.city.as_deref(), Some("New York"));
        assert_eq!(loader.tables().country_of("QQQ"), "XX");
    }

    #[test]
    fn test_domestic_rates_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let rate = loader
            .tables()
            .meal_rate("DE", None, date("2024-06-01"))
            .unwrap();
        assert_eq!(rate.partial, dec("14"));
        assert_eq!(rate.full, dec("28"));
    }

    #[test]
    fn test_city_overrides_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let tables = loader.tables();
        for (country, city) in [("US", "New York"), ("IN", "Mumbai"), ("ZA", "Cape Town")] {
            let city_rate = tables
                .meal_rate(country, Some(city), date("2024-06-01"))
                .unwrap();
            let country_rate = tables.meal_rate(country, None, date("2024-06-01")).unwrap();
            assert_eq!(city_rate.city.as_deref(), Some(city));
            assert_ne!(city_rate.full, country_rate.full, "{} should differ", city);
        }
    }

    #[test]
    fn test_commute_rates_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let rates = loader.tables().commute_rates(date("2024-06-01")).unwrap();
        assert_eq!(rates.rate_first_20km, dec("0.30"));
        assert_eq!(rates.rate_above_20km, dec("0.38"));
    }

    #[test]
    fn test_default_settings_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let defaults = loader.default_settings();
        assert_eq!(defaults.cleaning_cost_per_day, dec("1.60"));
        assert_eq!(defaults.tip_rate_per_night, dec("3.60"));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");
        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("jurisdiction.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
