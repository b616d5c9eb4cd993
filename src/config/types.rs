//! Reference data types for deduction calculation.
//!
//! This module contains the strongly-typed structures deserialized from the
//! YAML reference files, the in-memory [`ReferenceTables`] built from them, and
//! the [`ReferenceData`] trait through which the engine reads them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Country code used for airports missing from the airport table.
pub const UNKNOWN_COUNTRY: &str = "XX";

/// Metadata about the modelled tax jurisdiction.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionMetadata {
    /// Jurisdiction code (e.g., "DE").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// ISO code of the country whose rates count as domestic.
    pub home_country: String,
    /// Version of the reference data.
    pub version: String,
    /// URL of the official rate publication.
    pub source_url: String,
}

/// An airport entry of the airport lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Airport {
    /// ISO country code.
    pub country: String,
    /// City name used for city-level rate overrides.
    #[serde(default)]
    pub city: Option<String>,
    /// IANA timezone name.
    pub timezone: String,
}

/// Airports configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct AirportsConfig {
    /// Map of IATA code to airport details.
    pub airports: HashMap<String, Airport>,
}

/// Tiered commute deduction rates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommuteRates {
    /// Rate per kilometre up to the tier threshold.
    pub rate_first_20km: Decimal,
    /// Rate per kilometre beyond the tier threshold.
    pub rate_above_20km: Decimal,
    /// Distance at which the higher rate starts.
    pub tier_threshold_km: Decimal,
}

/// City override within a country rate entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CityRateConfig {
    /// City name as used in the airport table.
    pub city: String,
    /// Partial-day rate.
    pub partial: Decimal,
    /// Full-day rate.
    pub full: Decimal,
}

/// Per-diem rates of one country.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryRateConfig {
    /// ISO country code.
    pub country: String,
    /// Country name.
    pub name: String,
    /// Partial-day rate.
    pub partial: Decimal,
    /// Full-day rate.
    pub full: Decimal,
    /// City-level overrides.
    #[serde(default)]
    pub cities: Vec<CityRateConfig>,
}

/// Rate configuration for one effective period (one file under `rates/`).
#[derive(Debug, Clone, Deserialize)]
pub struct RateConfig {
    /// First date the rates apply to.
    pub effective_from: NaiveDate,
    /// Last date the rates apply to; open-ended when absent.
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
    /// Commute deduction rates.
    pub commute: CommuteRates,
    /// Per-diem rates by country.
    pub countries: Vec<CountryRateConfig>,
}

impl RateConfig {
    /// Returns true if the period covers the given date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_until.is_none_or(|until| date <= until)
    }
}

/// A resolved per-diem rate for a country or city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRate {
    /// ISO country code.
    pub country: String,
    /// City the rate applies to, when it is a city override.
    pub city: Option<String>,
    /// Partial-day rate.
    pub partial: Decimal,
    /// Full-day rate.
    pub full: Decimal,
    /// First date the rate applies to.
    pub effective_from: NaiveDate,
    /// Last date the rate applies to.
    pub effective_until: Option<NaiveDate>,
}

/// Read-only access to the reference tables the engine depends on.
///
/// The engine never reaches for global state; callers pass an implementation
/// of this trait into every calculation so tests can substitute fixtures.
pub trait ReferenceData {
    /// ISO code of the home country.
    fn home_country(&self) -> &str;

    /// Looks up an airport by IATA code.
    fn airport(&self, code: &str) -> Option<&Airport>;

    /// Resolves the per-diem rate for a country on a date, preferring a city
    /// override when `city` matches one.
    fn meal_rate(&self, country: &str, city: Option<&str>, date: NaiveDate)
    -> Option<CountryRate>;

    /// Commute rates effective on a date.
    fn commute_rates(&self, date: NaiveDate) -> Option<&CommuteRates>;

    /// Country of an airport, or [`UNKNOWN_COUNTRY`] for unknown codes.
    fn country_of(&self, code: &str) -> &str {
        self.airport(code)
            .map(|airport| airport.country.as_str())
            .unwrap_or(UNKNOWN_COUNTRY)
    }

    /// City of an airport, when known.
    fn city_of(&self, code: &str) -> Option<&str> {
        self.airport(code).and_then(|airport| airport.city.as_deref())
    }
}

/// The complete reference data loaded from YAML files.
///
/// This struct aggregates all configuration loaded from the various YAML
/// files in a reference data directory. It can also be built directly, which
/// is how tests provide fixtures.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    /// Jurisdiction metadata.
    metadata: JurisdictionMetadata,
    /// Airport lookup by IATA code.
    airports: HashMap<String, Airport>,
    /// Rate configurations by effective date (sorted oldest first).
    rates: Vec<RateConfig>,
}

impl ReferenceTables {
    /// Creates reference tables from their component parts.
    pub fn new(
        metadata: JurisdictionMetadata,
        airports: HashMap<String, Airport>,
        rates: Vec<RateConfig>,
    ) -> Self {
        let mut sorted_rates = rates;
        sorted_rates.sort_by(|a, b| a.effective_from.cmp(&b.effective_from));
        Self {
            metadata,
            airports,
            rates: sorted_rates,
        }
    }

    /// Returns the jurisdiction metadata.
    pub fn jurisdiction(&self) -> &JurisdictionMetadata {
        &self.metadata
    }

    /// Returns all airports.
    pub fn airports(&self) -> &HashMap<String, Airport> {
        &self.airports
    }

    /// Returns all rate configurations.
    pub fn rates(&self) -> &[RateConfig] {
        &self.rates
    }

    /// The most recent rate configuration covering a date.
    fn rate_config_for(&self, date: NaiveDate) -> Option<&RateConfig> {
        self.rates.iter().rev().find(|rc| rc.covers(date))
    }
}

impl ReferenceData for ReferenceTables {
    fn home_country(&self) -> &str {
        &self.metadata.home_country
    }

    fn airport(&self, code: &str) -> Option<&Airport> {
        self.airports.get(&code.trim().to_ascii_uppercase())
    }

    fn meal_rate(
        &self,
        country: &str,
        city: Option<&str>,
        date: NaiveDate,
    ) -> Option<CountryRate> {
        let rate_config = self.rate_config_for(date)?;
        let entry = rate_config
            .countries
            .iter()
            .find(|c| c.country.eq_ignore_ascii_case(country))?;

        let city_override = city.and_then(|name| {
            entry
                .cities
                .iter()
                .find(|c| c.city.eq_ignore_ascii_case(name))
        });

        Some(match city_override {
            Some(city_rate) => CountryRate {
                country: entry.country.clone(),
                city: Some(city_rate.city.clone()),
                partial: city_rate.partial,
                full: city_rate.full,
                effective_from: rate_config.effective_from,
                effective_until: rate_config.effective_until,
            },
            None => CountryRate {
                country: entry.country.clone(),
                city: None,
                partial: entry.partial,
                full: entry.full,
                effective_from: rate_config.effective_from,
                effective_until: rate_config.effective_until,
            },
        })
    }

    fn commute_rates(&self, date: NaiveDate) -> Option<&CommuteRates> {
        self.rate_config_for(date).map(|rc| &rc.commute)
    }
}
