//! Absence-from-home measurement.
//!
//! The absence of a date is the time between leaving home and returning,
//! built from the commute, the briefing before the first departure, the
//! flight duty and the de-briefing after the last arrival. Multi-day trips
//! abroad are measured by the crew's whereabouts at the start and end of
//! every date; domestic trips are measured date by date.

use chrono::{Duration, NaiveDate};

use crate::config::ReferenceData;
use crate::models::{AuditStep, DutyType, MINUTES_PER_DAY, Settings, TripDayRole};

use super::duty_time::{
    SIMULATOR_BRIEFING_MINUTES, TimedFlight, TimedGroundDay, briefing_minutes, commute_minutes,
    post_flight_minutes,
};
use super::trips::Trip;

/// Rule reference for absence measurement.
pub const ABSENCE_LEGAL_REF: &str = "§ 9 Abs. 4a Satz 3 EStG";

/// Where a crew spent a date, resolved against the reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLocation {
    /// IATA airport code.
    pub airport: String,
    /// ISO country code, or `"XX"` when unknown.
    pub country: String,
    /// City, when the airport table knows it.
    pub city: Option<String>,
}

/// The measured absence of one trip date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAbsence {
    /// The calendar date.
    pub date: NaiveDate,
    /// The role of the date within its trip.
    pub role: TripDayRole,
    /// Minutes away from home on the date.
    pub minutes: u32,
    /// True when the date starts an overnight stay away from home.
    pub overnight_stay: bool,
    /// True when the crew is away from home for the whole date.
    pub whole_day_away: bool,
    /// Where the crew spent the date; `None` when no flight touches it.
    pub location: Option<DayLocation>,
}

/// The result of measuring a trip, including the audit step.
#[derive(Debug, Clone)]
pub struct TripAbsenceResult {
    /// One entry per trip date, in date order.
    pub days: Vec<DayAbsence>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Measures the absence of every date of a trip.
///
/// # Arguments
///
/// * `trip` - The trip to measure
/// * `settings` - Supplies the commute distance
/// * `reference` - Resolves airports to countries and cities
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_trip_absence<R: ReferenceData + ?Sized>(
    trip: &Trip<'_>,
    settings: &Settings,
    reference: &R,
    step_number: u32,
) -> TripAbsenceResult {
    let commute = commute_minutes(settings.effective_distance_km());
    let foreign = is_foreign_trip(trip, reference);

    let days: Vec<DayAbsence> = trip
        .dates()
        .map(|date| {
            if foreign {
                measure_foreign_date(trip, date, commute, reference)
            } else {
                measure_domestic_date(trip, date, commute, reference)
            }
        })
        .collect();

    let per_day: Vec<serde_json::Value> = days
        .iter()
        .map(|day| {
            serde_json::json!({
                "date": day.date.to_string(),
                "role": day.role.to_string(),
                "minutes": day.minutes,
                "overnight_stay": day.overnight_stay,
                "location": day.location.as_ref().map(|l| l.airport.clone()),
            })
        })
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "trip_absence".to_string(),
        rule_name: "Trip Absence Measurement".to_string(),
        legal_ref: ABSENCE_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "start": trip.start.to_string(),
            "end": trip.end.to_string(),
            "flights": trip.flights.len(),
            "ground_days": trip.ground_days.len(),
            "commute_minutes": commute,
        }),
        output: serde_json::json!({
            "foreign": foreign,
            "days": per_day,
        }),
        reasoning: format!(
            "{} trip of {} day(s) from {} to {}, measured {}",
            if foreign { "Foreign" } else { "Domestic" },
            trip.day_count(),
            trip.start,
            trip.end,
            if foreign {
                "by whereabouts at start and end of each date"
            } else {
                "date by date"
            }
        ),
    };

    TripAbsenceResult { days, audit_step }
}

/// Measured absence of a non-flight day: commute, duty span and commute,
/// plus the simulator briefing and de-briefing. Days without recorded times
/// measure zero.
pub fn ground_day_absence(day: &TimedGroundDay<'_>, settings: &Settings) -> u32 {
    let Some(span) = day.span_minutes else {
        return 0;
    };
    let commute = commute_minutes(settings.effective_distance_km());
    let briefings = if day.day.duty_type == DutyType::Simulator {
        2 * SIMULATOR_BRIEFING_MINUTES
    } else {
        0
    };
    commute
        .saturating_mul(2)
        .saturating_add(span)
        .saturating_add(briefings)
}

/// Minutes of a date on which the crew leaves home and returns: commute,
/// briefing, block times plus ground time between legs, de-briefing, commute.
pub fn day_trip_minutes(flights: &[&TimedFlight<'_>], commute: u32) -> u32 {
    let (Some(first), Some(last)) = (flights.first(), flights.last()) else {
        return 0;
    };
    let block = flights
        .iter()
        .fold(0u32, |total, f| total.saturating_add(f.block_minutes));
    let ground = flights
        .windows(2)
        .fold(0u32, |total, pair| total.saturating_add(minutes_between(pair[0], pair[1])));
    [
        commute,
        briefing_minutes(first.category()),
        block,
        ground,
        post_flight_minutes(last.category()),
        commute,
    ]
    .into_iter()
    .fold(0u32, u32::saturating_add)
}

fn minutes_between(earlier: &TimedFlight<'_>, later: &TimedFlight<'_>) -> u32 {
    let gap = (later.departs_at() - earlier.arrives_at()).num_minutes();
    u32::try_from(gap).unwrap_or(0)
}

fn departure_minutes(first: &TimedFlight<'_>, commute: u32) -> u32 {
    (MINUTES_PER_DAY - first.departure.minutes())
        .saturating_add(briefing_minutes(first.category()))
        .saturating_add(commute)
}

fn arrival_minutes(last: &TimedFlight<'_>, commute: u32) -> u32 {
    (last.arrival.minutes() + post_flight_minutes(last.category())).saturating_add(commute)
}

fn is_foreign_trip<R: ReferenceData + ?Sized>(trip: &Trip<'_>, reference: &R) -> bool {
    let home = reference.home_country();
    trip.flights.iter().any(|f| {
        departure_location(f, reference).country != home
            || arrival_location(f, reference).country != home
    })
}

fn arrival_location<R: ReferenceData + ?Sized>(
    flight: &TimedFlight<'_>,
    reference: &R,
) -> DayLocation {
    let code = flight.flight.arrival.as_str();
    DayLocation {
        airport: code.to_string(),
        country: flight
            .flight
            .country
            .clone()
            .unwrap_or_else(|| reference.country_of(code).to_string()),
        city: reference.city_of(code).map(str::to_string),
    }
}

fn departure_location<R: ReferenceData + ?Sized>(
    flight: &TimedFlight<'_>,
    reference: &R,
) -> DayLocation {
    let code = flight.flight.departure.as_str();
    DayLocation {
        airport: code.to_string(),
        country: reference.country_of(code).to_string(),
        city: reference.city_of(code).map(str::to_string),
    }
}

fn whereabouts_location<R: ReferenceData + ?Sized>(
    trip: &Trip<'_>,
    date: NaiveDate,
    reference: &R,
) -> Option<DayLocation> {
    let whereabouts = trip.whereabouts_on(date)?;
    Some(if whereabouts.at_departure {
        departure_location(whereabouts.flight, reference)
    } else {
        arrival_location(whereabouts.flight, reference)
    })
}

/// The last foreign place the crew left on or before the date, falling back
/// to its whereabouts.
fn last_foreign_location<R: ReferenceData + ?Sized>(
    trip: &Trip<'_>,
    date: NaiveDate,
    reference: &R,
) -> Option<DayLocation> {
    let home = reference.home_country();
    trip.flights
        .iter()
        .rev()
        .filter(|f| f.departure_date() <= date)
        .map(|f| departure_location(f, reference))
        .find(|location| location.country != home)
        .or_else(|| whereabouts_location(trip, date, reference))
}

fn away_at_end(trip: &Trip<'_>, date: NaiveDate) -> bool {
    if date >= trip.end {
        return false;
    }
    if trip.airborne_at_midnight(date) {
        return true;
    }
    match (trip.origin(), trip.location_on(date)) {
        (Some(origin), Some(location)) => !location.eq_ignore_ascii_case(origin),
        _ => false,
    }
}

fn away_at_start(trip: &Trip<'_>, date: NaiveDate) -> bool {
    date > trip.start && away_at_end(trip, date - Duration::days(1))
}

fn measure_foreign_date<R: ReferenceData + ?Sized>(
    trip: &Trip<'_>,
    date: NaiveDate,
    commute: u32,
    reference: &R,
) -> DayAbsence {
    let role = trip.role_of(date);
    let departing: Vec<&TimedFlight<'_>> = trip.flights_departing_on(date).collect();
    let mut day = DayAbsence {
        date,
        role,
        minutes: 0,
        overnight_stay: false,
        whole_day_away: false,
        location: None,
    };

    match (away_at_start(trip, date), away_at_end(trip, date)) {
        (true, true) => {
            day.minutes = MINUTES_PER_DAY;
            day.whole_day_away = true;
            day.location = whereabouts_location(trip, date, reference);
        }
        (false, true) => {
            if let Some(first) = departing.first() {
                day.minutes = departure_minutes(first, commute);
                day.overnight_stay = true;
                day.location = whereabouts_location(trip, date, reference);
            }
        }
        (true, false) => {
            if let Some(last) = trip.flights.iter().rev().find(|f| f.arrival_date() == date) {
                day.minutes = arrival_minutes(last, commute);
                day.location = last_foreign_location(trip, date, reference);
            }
        }
        (false, false) => {
            if !departing.is_empty() {
                day.minutes = day_trip_minutes(&departing, commute);
                day.location = last_foreign_location(trip, date, reference);
            }
        }
    }

    day
}

fn measure_domestic_date<R: ReferenceData + ?Sized>(
    trip: &Trip<'_>,
    date: NaiveDate,
    commute: u32,
    reference: &R,
) -> DayAbsence {
    let role = trip.role_of(date);
    let departing: Vec<&TimedFlight<'_>> = trip.flights_departing_on(date).collect();
    let mut day = DayAbsence {
        date,
        role,
        minutes: 0,
        overnight_stay: false,
        whole_day_away: false,
        location: None,
    };

    if !departing.is_empty() {
        day.minutes = day_trip_minutes(&departing, commute);
        day.location = whereabouts_location(trip, date, reference);
    } else if let Some(arriving) = trip.overnight_arrival_on(date) {
        day.minutes = arrival_minutes(arriving, commute);
        day.location = Some(arrival_location(arriving, reference));
    } else if away_at_start(trip, date) && away_at_end(trip, date) {
        day.minutes = MINUTES_PER_DAY;
        day.whole_day_away = true;
        day.location = whereabouts_location(trip, date, reference);
    }

    day
}
