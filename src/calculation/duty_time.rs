//! Duty time parsing and fixed duty durations.
//!
//! This module turns the textual times of roster records into minutes and
//! holds the briefing, de-briefing and commute durations that are added to
//! flight duty when measuring absence from home.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AircraftCategory, ClockTime, Flight, MINUTES_PER_DAY, NonFlightDay, parse_duration_minutes,
};

/// Briefing before a long-haul departure.
pub const LONG_HAUL_BRIEFING_MINUTES: u32 = 110;

/// Briefing before a short-haul departure flown as cockpit crew.
pub const SHORT_HAUL_COCKPIT_BRIEFING_MINUTES: u32 = 80;

/// Briefing before a short-haul departure flown as cabin crew.
pub const SHORT_HAUL_CABIN_BRIEFING_MINUTES: u32 = 85;

/// Briefing before and de-briefing after a simulator session.
pub const SIMULATOR_BRIEFING_MINUTES: u32 = 60;

/// De-briefing after every non-simulator flight.
pub const DEBRIEFING_MINUTES: u32 = 30;

/// Minutes of duty added before departure for an aircraft category.
pub fn briefing_minutes(category: AircraftCategory) -> u32 {
    match category {
        AircraftCategory::LongHaul => LONG_HAUL_BRIEFING_MINUTES,
        AircraftCategory::ShortHaulCockpit => SHORT_HAUL_COCKPIT_BRIEFING_MINUTES,
        AircraftCategory::ShortHaulCabin => SHORT_HAUL_CABIN_BRIEFING_MINUTES,
        AircraftCategory::Simulator => SIMULATOR_BRIEFING_MINUTES,
    }
}

/// Minutes of duty added after arrival for an aircraft category.
pub fn post_flight_minutes(category: AircraftCategory) -> u32 {
    match category {
        AircraftCategory::Simulator => SIMULATOR_BRIEFING_MINUTES,
        _ => DEBRIEFING_MINUTES,
    }
}

/// One-way commute time in minutes: half the distance in kilometres, rounded
/// to the nearest minute. Negative distances count as zero.
///
/// # Example
///
/// ```
/// use crew_tax_engine::calculation::commute_minutes;
/// use rust_decimal::Decimal;
///
/// assert_eq!(commute_minutes(Decimal::new(25, 0)), 13);
/// assert_eq!(commute_minutes(Decimal::new(24, 0)), 12);
/// assert_eq!(commute_minutes(Decimal::new(-10, 0)), 0);
/// ```
pub fn commute_minutes(distance_km: Decimal) -> u32 {
    (distance_km.max(Decimal::ZERO) / Decimal::TWO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or_default()
}

/// A flight with its times parsed.
#[derive(Debug, Clone)]
pub struct TimedFlight<'a> {
    /// The roster record.
    pub flight: &'a Flight,
    /// Local departure time.
    pub departure: ClockTime,
    /// Local arrival time.
    pub arrival: ClockTime,
    /// Block time in minutes.
    pub block_minutes: u32,
    /// True when the flight lands on the calendar day after departure.
    pub overnight: bool,
}

impl TimedFlight<'_> {
    /// The calendar date of departure.
    pub fn departure_date(&self) -> NaiveDate {
        self.flight.date
    }

    /// The calendar date of arrival.
    pub fn arrival_date(&self) -> NaiveDate {
        if self.overnight {
            self.flight.date + Duration::days(1)
        } else {
            self.flight.date
        }
    }

    /// Departure as a local date and time.
    pub fn departs_at(&self) -> NaiveDateTime {
        at_clock(self.departure_date(), self.departure)
    }

    /// Arrival as a local date and time.
    pub fn arrives_at(&self) -> NaiveDateTime {
        at_clock(self.arrival_date(), self.arrival)
    }

    /// The aircraft category.
    pub fn category(&self) -> AircraftCategory {
        self.flight.aircraft_category
    }
}

fn at_clock(date: NaiveDate, time: ClockTime) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN) + Duration::minutes(i64::from(time.minutes()))
}

/// Parses the times of a flight record.
///
/// # Errors
///
/// Returns [`EngineError::MalformedDutyRecord`] if the departure time, arrival
/// time or block time cannot be parsed.
pub fn time_flight(flight: &Flight) -> EngineResult<TimedFlight<'_>> {
    let malformed = |field: &str, detail: String| EngineError::MalformedDutyRecord {
        record: flight.describe(),
        message: format!("invalid {}: {}", field, detail),
    };

    let departure: ClockTime = flight
        .departure_time
        .parse()
        .map_err(|e| malformed("departure time", e))?;
    let arrival: ClockTime = flight
        .arrival_time
        .parse()
        .map_err(|e| malformed("arrival time", e))?;
    let block_minutes =
        parse_duration_minutes(&flight.block_time).map_err(|e| malformed("block time", e))?;

    Ok(TimedFlight {
        flight,
        departure,
        arrival,
        block_minutes,
        overnight: arrival < departure,
    })
}

/// A non-flight day with its optional duty span parsed.
#[derive(Debug, Clone)]
pub struct TimedGroundDay<'a> {
    /// The roster record.
    pub day: &'a NonFlightDay,
    /// Minutes between duty start and end, when both are recorded.
    pub span_minutes: Option<u32>,
}

/// Parses the optional duty times of a non-flight day.
///
/// # Errors
///
/// Returns [`EngineError::MalformedDutyRecord`] if a time cannot be parsed or
/// only one of start and end is present.
pub fn time_ground_day(day: &NonFlightDay) -> EngineResult<TimedGroundDay<'_>> {
    let malformed = |message: String| EngineError::MalformedDutyRecord {
        record: day.describe(),
        message,
    };

    let span_minutes = match (&day.start_time, &day.end_time) {
        (None, None) => None,
        (Some(start), Some(end)) => {
            let start: ClockTime = start
                .parse()
                .map_err(|e| malformed(format!("invalid start time: {}", e)))?;
            let end: ClockTime = end
                .parse()
                .map_err(|e| malformed(format!("invalid end time: {}", e)))?;
            Some(if end < start {
                MINUTES_PER_DAY - start.minutes() + end.minutes()
            } else {
                end.minutes() - start.minutes()
            })
        }
        _ => return Err(malformed("start and end time must be given together".to_string())),
    };

    Ok(TimedGroundDay { day, span_minutes })
}
