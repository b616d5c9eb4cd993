//! Shared test fixtures: a small in-memory reference table and record builders.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::{
    Airport, CityRateConfig, CommuteRates, CountryRateConfig, JurisdictionMetadata, RateConfig,
    ReferenceTables,
};
use crate::models::{AircraftCategory, DutyType, Flight, NonFlightDay, Settings};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn airport(country: &str, city: &str) -> Airport {
    Airport {
        country: country.to_string(),
        city: Some(city.to_string()),
        timezone: "UTC".to_string(),
    }
}

fn country(code: &str, partial: &str, full: &str, cities: &[(&str, &str, &str)]) -> CountryRateConfig {
    CountryRateConfig {
        country: code.to_string(),
        name: code.to_string(),
        partial: dec(partial),
        full: dec(full),
        cities: cities
            .iter()
            .map(|(city, partial, full)| CityRateConfig {
                city: city.to_string(),
                partial: dec(partial),
                full: dec(full),
            })
            .collect(),
    }
}

fn commute() -> CommuteRates {
    CommuteRates {
        rate_first_20km: dec("0.30"),
        rate_above_20km: dec("0.38"),
        tier_threshold_km: dec("20"),
    }
}

/// Reference tables with a 2023 period (closed) and an open 2024 period.
pub fn reference_tables() -> ReferenceTables {
    let metadata = JurisdictionMetadata {
        code: "DE".to_string(),
        name: "Germany".to_string(),
        home_country: "DE".to_string(),
        version: "test".to_string(),
        source_url: "https://example.invalid".to_string(),
    };

    let airports: HashMap<String, Airport> = [
        ("FRA", airport("DE", "Frankfurt")),
        ("MUC", airport("DE", "Munich")),
        ("HAM", airport("DE", "Hamburg")),
        ("JFK", airport("US", "New York")),
        ("DEN", airport("US", "Denver")),
        ("BOM", airport("IN", "Mumbai")),
        ("DEL", airport("IN", "New Delhi")),
        ("CPT", airport("ZA", "Cape Town")),
        ("LHR", airport("GB", "London")),
        ("MAN", airport("GB", "Manchester")),
        ("CDG", airport("FR", "Paris")),
        ("MCM", airport("MC", "Monaco")),
    ]
    .into_iter()
    .map(|(code, airport)| (code.to_string(), airport))
    .collect();

    let rates_2023 = RateConfig {
        effective_from: date("2023-01-01"),
        effective_until: Some(date("2023-12-31")),
        commute: commute(),
        countries: vec![
            country("DE", "14", "28", &[]),
            country("US", "38", "57", &[("New York", "44", "66")]),
        ],
    };

    let rates_2024 = RateConfig {
        effective_from: date("2024-01-01"),
        effective_until: None,
        commute: commute(),
        countries: vec![
            country("DE", "14", "28", &[]),
            country("US", "40", "59", &[("New York", "44", "66")]),
            country("IN", "21", "32", &[("Mumbai", "36", "53")]),
            country("ZA", "20", "29", &[("Cape Town", "22", "33")]),
            country("GB", "35", "52", &[("London", "44", "66")]),
            country("FR", "36", "53", &[("Paris", "39", "58")]),
        ],
    };

    ReferenceTables::new(metadata, airports, vec![rates_2024, rates_2023])
}

/// A flight leg; block time is given explicitly.
pub fn flight(
    on: &str,
    from: &str,
    to: &str,
    departure_time: &str,
    arrival_time: &str,
    block_time: &str,
    category: AircraftCategory,
) -> Flight {
    Flight {
        date: date(on),
        departure: from.to_string(),
        arrival: to.to_string(),
        departure_time: departure_time.to_string(),
        arrival_time: arrival_time.to_string(),
        duty_code: "FL".to_string(),
        flight_number: format!("LH{}{}", from, to),
        block_time: block_time.to_string(),
        aircraft_category: category,
        country: None,
        is_continuation: false,
    }
}

pub fn ground_day(on: &str, duty_type: DutyType) -> NonFlightDay {
    NonFlightDay {
        date: date(on),
        duty_type,
        description: duty_type.to_string(),
        country: None,
        start_time: None,
        end_time: None,
    }
}

pub fn timed_ground_day(on: &str, duty_type: DutyType, start: &str, end: &str) -> NonFlightDay {
    NonFlightDay {
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        ..ground_day(on, duty_type)
    }
}

pub fn settings(distance_km: &str) -> Settings {
    Settings {
        distance_to_work_km: dec(distance_km),
        ..Settings::default()
    }
}
