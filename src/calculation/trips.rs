//! Trip building and trip-day classification.
//!
//! A trip is a maximal run of consecutive calendar dates with duty activity.
//! Duty activity covers every record date, the landing date of an overnight
//! flight, and the layover dates a crew spends away from the trip's origin
//! between two flights. Each date of a trip is then classified as a
//! single, departure, intermediate or arrival day.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::models::TripDayRole;

use super::duty_time::{TimedFlight, TimedGroundDay};

/// A contiguous run of duty dates together with its records.
#[derive(Debug, Clone)]
pub struct Trip<'a> {
    /// First date of the trip.
    pub start: NaiveDate,
    /// Last date of the trip.
    pub end: NaiveDate,
    /// Flights departing within the trip, in chronological order.
    pub flights: Vec<TimedFlight<'a>>,
    /// Non-flight days within the trip, in input order.
    pub ground_days: Vec<TimedGroundDay<'a>>,
}

impl<'a> Trip<'a> {
    /// Iterates over every date of the trip.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Number of calendar dates in the trip.
    pub fn day_count(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days() + 1).unwrap_or(u32::MAX)
    }

    /// Returns true for a trip of a single calendar date.
    pub fn is_day_trip(&self) -> bool {
        self.start == self.end
    }

    /// Departure airport of the trip's first flight.
    pub fn origin(&self) -> Option<&str> {
        self.flights.first().map(|f| f.flight.departure.as_str())
    }

    /// Flights departing on a date.
    pub fn flights_departing_on(
        &self,
        date: NaiveDate,
    ) -> impl Iterator<Item = &TimedFlight<'a>> + '_ {
        self.flights
            .iter()
            .filter(move |f| f.departure_date() == date)
    }

    /// The overnight flight landing on a date, if any.
    pub fn overnight_arrival_on(&self, date: NaiveDate) -> Option<&TimedFlight<'a>> {
        self.flights
            .iter()
            .rev()
            .find(|f| f.overnight && f.arrival_date() == date)
    }

    /// Non-flight days on a date, in input order.
    pub fn ground_days_on(
        &self,
        date: NaiveDate,
    ) -> impl Iterator<Item = &TimedGroundDay<'a>> + '_ {
        self.ground_days.iter().filter(move |g| g.day.date == date)
    }

    /// Where the crew is at the end of a date.
    ///
    /// This is the arrival airport of the last flight departing on or before
    /// the date, except when that flight leaves a layover and is still in the
    /// air at midnight: the crew then spent the date at the layover airport.
    pub fn whereabouts_on(&self, date: NaiveDate) -> Option<Whereabouts<'_, 'a>> {
        let flight = self
            .flights
            .iter()
            .rev()
            .find(|f| f.departure_date() <= date)?;
        let leaves_layover = self
            .origin()
            .is_some_and(|origin| !flight.flight.departure.eq_ignore_ascii_case(origin));
        let at_departure = flight.overnight && flight.departure_date() == date && leaves_layover;
        Some(Whereabouts {
            flight,
            at_departure,
        })
    }

    /// Airport code of [`Trip::whereabouts_on`].
    pub fn location_on(&self, date: NaiveDate) -> Option<&str> {
        self.whereabouts_on(date).map(|w| w.airport())
    }

    /// Returns true if a flight departing on the date is in the air at midnight.
    pub fn airborne_at_midnight(&self, date: NaiveDate) -> bool {
        self.flights_departing_on(date).any(|f| f.overnight)
    }

    /// Returns true if the crew spends the night after `date` on the ground
    /// away from the trip's origin.
    ///
    /// The last date of a trip never starts a night away: its absence already
    /// includes the way home.
    pub fn is_night_away(&self, date: NaiveDate) -> bool {
        if date >= self.end {
            return false;
        }
        match (self.origin(), self.location_on(date)) {
            (Some(origin), Some(location)) => {
                !location.eq_ignore_ascii_case(origin) && !self.airborne_at_midnight(date)
            }
            _ => false,
        }
    }

    /// The per-diem role of a date within the trip.
    pub fn role_of(&self, date: NaiveDate) -> TripDayRole {
        if self.is_day_trip() {
            TripDayRole::SingleDay
        } else if date == self.start {
            TripDayRole::DepartureDay
        } else if date == self.end {
            TripDayRole::ArrivalDay
        } else {
            TripDayRole::IntermediateDay
        }
    }
}

/// The flight that determines where a crew is at the end of a date.
#[derive(Debug, Clone, Copy)]
pub struct Whereabouts<'t, 'a> {
    /// The flight.
    pub flight: &'t TimedFlight<'a>,
    /// True if the crew is at the flight's departure airport rather than its
    /// arrival airport.
    pub at_departure: bool,
}

impl<'t> Whereabouts<'t, '_> {
    /// The airport code.
    pub fn airport(&self) -> &'t str {
        if self.at_departure {
            &self.flight.flight.departure
        } else {
            &self.flight.flight.arrival
        }
    }
}

/// Classifies every date of a trip.
///
/// # Example
///
/// ```
/// use crew_tax_engine::calculation::{Trip, classify_trip_days};
/// use crew_tax_engine::models::TripDayRole;
/// use chrono::NaiveDate;
///
/// let trip = Trip {
///     start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     end: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
///     flights: vec![],
///     ground_days: vec![],
/// };
/// let roles: Vec<TripDayRole> = classify_trip_days(&trip).into_iter().map(|(_, r)| r).collect();
/// assert_eq!(
///     roles,
///     vec![TripDayRole::DepartureDay, TripDayRole::IntermediateDay, TripDayRole::ArrivalDay]
/// );
/// ```
pub fn classify_trip_days(trip: &Trip<'_>) -> Vec<(NaiveDate, TripDayRole)> {
    trip.dates().map(|date| (date, trip.role_of(date))).collect()
}

/// Groups flights and non-flight days into trips.
///
/// Flights are ordered chronologically; trips are returned in date order.
pub fn build_trips<'a>(
    flights: Vec<TimedFlight<'a>>,
    ground_days: Vec<TimedGroundDay<'a>>,
) -> Vec<Trip<'a>> {
    let mut flights = flights;
    flights.sort_by_key(|f| f.departs_at());

    let mut active: BTreeSet<NaiveDate> = BTreeSet::new();
    for flight in &flights {
        active.insert(flight.departure_date());
        active.insert(flight.arrival_date());
    }
    for day in &ground_days {
        active.insert(day.day.date);
    }
    fill_layovers(&flights, &mut active);

    let mut trips: Vec<Trip<'a>> = Vec::new();
    for date in active {
        match trips.last_mut() {
            Some(trip) if trip.end + Duration::days(1) == date => trip.end = date,
            _ => trips.push(Trip {
                start: date,
                end: date,
                flights: Vec::new(),
                ground_days: Vec::new(),
            }),
        }
    }

    for flight in flights {
        if let Some(trip) = find_trip(&mut trips, flight.departure_date()) {
            trip.flights.push(flight);
        }
    }
    for day in ground_days {
        if let Some(trip) = find_trip(&mut trips, day.day.date) {
            trip.ground_days.push(day);
        }
    }

    for trip in &trips {
        tracing::debug!(
            start = %trip.start,
            end = %trip.end,
            flights = trip.flights.len(),
            ground_days = trip.ground_days.len(),
            "Built trip"
        );
    }

    trips
}

/// Marks the dates between two flights as active while the crew is away from
/// the origin of its current rotation, or when the later leg continues the
/// earlier duty.
fn fill_layovers(flights: &[TimedFlight<'_>], active: &mut BTreeSet<NaiveDate>) {
    let mut rotation_origin: Option<&str> = None;

    for pair in flights.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        let origin = *rotation_origin.get_or_insert(previous.flight.departure.as_str());
        let returned = previous.flight.arrival.eq_ignore_ascii_case(origin);

        if !returned || next.flight.is_continuation {
            let mut date = previous.arrival_date() + Duration::days(1);
            while date < next.departure_date() {
                active.insert(date);
                date += Duration::days(1);
            }
        }

        if returned && !next.flight.is_continuation {
            rotation_origin = None;
        }
    }
}

fn find_trip<'t, 'a>(trips: &'t mut [Trip<'a>], date: NaiveDate) -> Option<&'t mut Trip<'a>> {
    trips
        .iter_mut()
        .find(|trip| trip.start <= date && date <= trip.end)
}
