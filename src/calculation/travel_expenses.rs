//! Hotel-night tips.
//!
//! Crews may deduct a flat tip for every night spent in a hotel away from the
//! trip's origin.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{AuditStep, TravelExpenses};

use super::trips::Trip;

/// The result of calculating travel expenses, including the audit step.
#[derive(Debug, Clone)]
pub struct TravelExpenseResult {
    /// The travel expenses.
    pub travel_expenses: TravelExpenses,
    /// The date each hotel night starts on.
    pub nights: BTreeSet<NaiveDate>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Dates on which a trip's crew ends the day on the ground away from the
/// trip's origin, excluding the trip's last date.
pub fn hotel_nights<'t>(trip: &'t Trip<'_>) -> impl Iterator<Item = NaiveDate> + 't {
    trip.dates().filter(move |date| trip.is_night_away(*date))
}

/// Calculates hotel-night tips over all trips.
///
/// # Arguments
///
/// * `trips` - All trips of the calculation
/// * `tip_rate` - Tip per hotel night (e.g., €3.60)
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_travel_expenses(
    trips: &[Trip<'_>],
    tip_rate: Decimal,
    step_number: u32,
) -> TravelExpenseResult {
    let nights: BTreeSet<NaiveDate> = trips.iter().flat_map(hotel_nights).collect();
    let hotel_nights = u32::try_from(nights.len()).unwrap_or(u32::MAX);
    let total = Decimal::from(hotel_nights) * tip_rate;

    let audit_step = AuditStep {
        step_number,
        rule_id: "travel_expenses".to_string(),
        rule_name: "Hotel Tips".to_string(),
        legal_ref: "§ 9 Abs. 1 Satz 3 Nr. 5a EStG".to_string(),
        input: serde_json::json!({
            "trips": trips.len(),
            "tip_rate": tip_rate.normalize().to_string(),
        }),
        output: serde_json::json!({
            "hotel_nights": hotel_nights,
            "total": total.normalize().to_string(),
        }),
        reasoning: format!(
            "{} hotel night(s) × €{} = €{}",
            hotel_nights,
            tip_rate.normalize(),
            total.normalize()
        ),
    };

    TravelExpenseResult {
        travel_expenses: TravelExpenses {
            hotel_nights,
            tip_rate,
            total,
        },
        nights,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::duty_time::time_flight;
    use crate::calculation::trips::build_trips;
    use crate::fixtures::{date, dec, flight};
    use crate::models::{AircraftCategory, Flight};

    fn expenses(flights: &[Flight]) -> TravelExpenseResult {
        let timed = flights.iter().map(|f| time_flight(f).unwrap()).collect();
        let trips = build_trips(timed, vec![]);
        calculate_travel_expenses(&trips, dec("3.60"), 1)
    }

    #[test]
    fn test_layover_nights_count() {
        let result = expenses(&[
            flight("2024-03-01", "FRA", "BOM", "11:00", "23:30", "8:30", AircraftCategory::LongHaul),
            flight("2024-03-04", "BOM", "FRA", "02:00", "07:10", "9:40", AircraftCategory::LongHaul),
        ]);
        // nights of 1st, 2nd and 3rd in Mumbai
        assert_eq!(result.travel_expenses.hotel_nights, 3);
        assert_eq!(result.travel_expenses.total, dec("10.80"));
        assert!(result.nights.contains(&date("2024-03-03")));
        assert!(!result.nights.contains(&date("2024-03-04")));
    }

    #[test]
    fn test_night_in_the_air_is_not_a_hotel_night() {
        let result = expenses(&[
            flight("2024-03-01", "FRA", "JFK", "10:00", "12:45", "8:45", AircraftCategory::LongHaul),
            flight("2024-03-02", "JFK", "FRA", "18:00", "07:55", "7:55", AircraftCategory::LongHaul),
        ]);
        assert_eq!(result.travel_expenses.hotel_nights, 1);
        assert!(result.nights.contains(&date("2024-03-01")));
    }

    #[test]
    fn test_one_way_day_trip_has_no_nights() {
        let result = expenses(&[flight(
            "2024-03-05",
            "FRA",
            "HAM",
            "07:00",
            "13:00",
            "6:00",
            AircraftCategory::ShortHaulCabin,
        )]);
        assert_eq!(result.travel_expenses.hotel_nights, 0);
        assert!(result.nights.is_empty());
    }

    #[test]
    fn test_rotation_ending_away_counts_only_inner_nights() {
        let result = expenses(&[
            flight("2024-03-01", "FRA", "LHR", "18:00", "18:45", "1:45", AircraftCategory::ShortHaulCabin),
            flight("2024-03-02", "LHR", "MAN", "09:00", "10:00", "1:00", AircraftCategory::ShortHaulCabin),
        ]);
        assert_eq!(result.travel_expenses.hotel_nights, 1);
        assert!(result.nights.contains(&date("2024-03-01")));
        assert!(!result.nights.contains(&date("2024-03-02")));
    }

    #[test]
    fn test_day_trip_has_no_nights() {
        let result = expenses(&[
            flight("2024-03-05", "FRA", "LHR", "07:00", "07:45", "1:45", AircraftCategory::ShortHaulCabin),
            flight("2024-03-05", "LHR", "FRA", "09:00", "11:40", "1:40", AircraftCategory::ShortHaulCabin),
        ]);
        assert_eq!(result.travel_expenses.hotel_nights, 0);
        assert_eq!(result.travel_expenses.total, Decimal::ZERO);
        assert_eq!(result.travel_expenses.tip_rate, dec("3.60"));
    }
}
