//! Request types for the Crew Tax Engine API.
//!
//! This module defines the JSON request structure for the `/calculate` endpoint.

use serde::{Deserialize, Serialize};

use crate::models::{Flight, NonFlightDay, Settings, SettingsOverrides};

/// Request body for the `/calculate` endpoint.
///
/// Contains the parsed roster records and, optionally, the user's settings.
/// Settings fields the request leaves out take the loaded defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    /// Flight legs.
    #[serde(default)]
    pub flights: Vec<Flight>,
    /// Non-flying duty days.
    #[serde(default)]
    pub non_flight_days: Vec<NonFlightDay>,
    /// User settings, possibly partial.
    #[serde(default)]
    pub settings: Option<SettingsOverrides>,
}

impl CalculationRequest {
    /// The request's settings merged over the given defaults.
    pub fn settings_over(&self, defaults: &Settings) -> Settings {
        match &self.settings {
            Some(overrides) => overrides.apply_to(defaults),
            None => defaults.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AircraftCategory, DutyType};
    use rust_decimal::Decimal;

    #[test]
    fn test_deserialize_calculation_request() {
        let json = r#"{
            "flights": [{
                "date": "2024-03-01",
                "departure": "FRA",
                "arrival": "JFK",
                "departureTime": "10:00",
                "arrivalTime": "12:45",
                "dutyCode": "FL",
                "flightNumber": "LH400",
                "blockTime": "8:45",
                "aircraftCategory": "long_haul"
            }],
            "nonFlightDays": [{
                "date": "2024-03-05",
                "dutyType": "medical"
            }],
            "settings": { "distanceToWorkKm": "42" }
        }"#;

        let request: CalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.flights.len(), 1);
        assert_eq!(request.flights[0].aircraft_category, AircraftCategory::LongHaul);
        assert!(!request.flights[0].is_continuation);
        assert_eq!(request.non_flight_days[0].duty_type, DutyType::Medical);
        let settings = request.settings.as_ref().unwrap();
        assert_eq!(settings.distance_to_work_km, Some(Decimal::new(42, 0)));
        assert_eq!(settings.cleaning_cost_per_day, None);
    }

    #[test]
    fn test_missing_settings_fall_back_to_defaults() {
        let request: CalculationRequest = serde_json::from_str(r#"{"flights": []}"#).unwrap();
        assert!(request.non_flight_days.is_empty());

        let defaults = Settings {
            distance_to_work_km: Decimal::new(7, 0),
            ..Settings::default()
        };
        assert_eq!(request.settings_over(&defaults), defaults);
    }

    #[test]
    fn test_partial_settings_merge_over_defaults() {
        let request: CalculationRequest = serde_json::from_str(
            r#"{ "settings": { "distanceToWorkKm": "30" } }"#,
        )
        .unwrap();
        let defaults = Settings {
            cleaning_cost_per_day: Decimal::new(250, 2),
            tip_rate_per_night: Decimal::new(500, 2),
            ..Settings::default()
        };

        let settings = request.settings_over(&defaults);
        assert_eq!(settings.distance_to_work_km, Decimal::new(30, 0));
        assert_eq!(settings.cleaning_cost_per_day, Decimal::new(250, 2));
        assert_eq!(settings.tip_rate_per_night, Decimal::new(500, 2));
    }
}
