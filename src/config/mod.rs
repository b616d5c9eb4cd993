//! Reference data and configuration for the Crew Tax Engine.
//!
//! This module loads the airport table, the per-diem and commute rate tables
//! and the default settings from YAML files, and defines the
//! [`ReferenceData`] trait the calculation engine reads them through.
//!
//! # Example
//!
//! ```no_run
//! use crew_tax_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/de").unwrap();
//! println!("Loaded jurisdiction: {}", config.tables().jurisdiction().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    Airport, AirportsConfig, CityRateConfig, CommuteRates, CountryRate, CountryRateConfig,
    JurisdictionMetadata, RateConfig, ReferenceData, ReferenceTables, UNKNOWN_COUNTRY,
};
