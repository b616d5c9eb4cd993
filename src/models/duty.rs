//! Duty record models.
//!
//! This module defines the [`Flight`] and [`NonFlightDay`] records produced by
//! the roster parser, the [`DutyRecord`] sum type that carries either of them,
//! and the [`ClockTime`] helper used to read their `HH:MM` fields.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A local wall-clock time of day, stored as minutes after midnight.
///
/// # Example
///
/// ```
/// use crew_tax_engine::models::ClockTime;
///
/// let time: ClockTime = "06:30".parse().unwrap();
/// assert_eq!(time.minutes(), 390);
/// assert_eq!(time.to_string(), "06:30");
/// assert!("24:00".parse::<ClockTime>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u32);

impl ClockTime {
    /// Creates a clock time from minutes after midnight, if it is within the day.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Returns the number of minutes after midnight.
    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hours, minutes) = split_hours_minutes(s)?;
        if hours > 23 {
            return Err(format!("hour out of range in '{}'", s));
        }
        Ok(Self(hours * 60 + minutes))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Parses an `H:MM` or `HH:MM` duration (block time) into minutes.
///
/// Unlike [`ClockTime`], the hour part may exceed 23.
///
/// # Example
///
/// ```
/// use crew_tax_engine::models::parse_duration_minutes;
///
/// assert_eq!(parse_duration_minutes("8:20"), Ok(500));
/// assert_eq!(parse_duration_minutes("25:05"), Ok(1505));
/// assert!(parse_duration_minutes("8h20").is_err());
/// ```
pub fn parse_duration_minutes(s: &str) -> Result<u32, String> {
    let (hours, minutes) = split_hours_minutes(s)?;
    hours
        .checked_mul(60)
        .and_then(|total| total.checked_add(minutes))
        .ok_or_else(|| format!("hour out of range in '{}'", s))
}

fn split_hours_minutes(s: &str) -> Result<(u32, u32), String> {
    let trimmed = s.trim();
    let (hours, minutes) = trimmed
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got '{}'", s))?;

    if hours.is_empty()
        || minutes.len() != 2
        || !hours.chars().all(|c| c.is_ascii_digit())
        || !minutes.chars().all(|c| c.is_ascii_digit())
    {
        return Err(format!("expected HH:MM, got '{}'", s));
    }

    let hours: u32 = hours
        .parse()
        .map_err(|_| format!("invalid hours in '{}'", s))?;
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| format!("invalid minutes in '{}'", s))?;

    if minutes > 59 {
        return Err(format!("minute out of range in '{}'", s));
    }

    Ok((hours, minutes))
}

/// Aircraft or operation category of a flight duty.
///
/// The category selects the briefing time added before departure and the
/// time added after arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AircraftCategory {
    /// Long-haul intercontinental operation.
    LongHaul,
    /// Short-haul operation flown as cockpit crew.
    ShortHaulCockpit,
    /// Short-haul operation flown as cabin crew.
    ShortHaulCabin,
    /// Full-flight simulator session.
    Simulator,
}

/// Duty type of a non-flying duty day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyType {
    /// General ground duty at the home base.
    GroundDuty,
    /// Aeromedical examination.
    Medical,
    /// Standby or reserve duty.
    Standby,
    /// Emergency and first-aid training.
    EmergencyMedical,
    /// Simulator session recorded as a ground day.
    Simulator,
    /// Classroom or e-learning training.
    Training,
    /// Office duty.
    Office,
    /// Any other duty code.
    #[serde(other)]
    Other,
}

impl DutyType {
    /// Returns true for the ground-duty codes that always earn the domestic
    /// partial rate when they count as a workday.
    pub fn is_flat_rate_ground_duty(self) -> bool {
        matches!(
            self,
            DutyType::Medical | DutyType::Standby | DutyType::EmergencyMedical
        )
    }
}

impl fmt::Display for DutyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            DutyType::GroundDuty => "ground_duty",
            DutyType::Medical => "medical",
            DutyType::Standby => "standby",
            DutyType::EmergencyMedical => "emergency_medical",
            DutyType::Simulator => "simulator",
            DutyType::Training => "training",
            DutyType::Office => "office",
            DutyType::Other => "other",
        };
        write!(f, "{}", code)
    }
}

/// A single flight leg taken from the crew roster.
///
/// Times are local wall-clock times at the respective airport. An arrival
/// time earlier than the departure time means the flight lands on the next
/// calendar day.
///
/// # Example
///
/// ```
/// use crew_tax_engine::models::{AircraftCategory, Flight};
/// use chrono::NaiveDate;
///
/// let flight = Flight {
///     date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     departure: "JFK".to_string(),
///     arrival: "FRA".to_string(),
///     departure_time: "22:10".to_string(),
///     arrival_time: "06:30".to_string(),
///     duty_code: "FL".to_string(),
///     flight_number: "LH401".to_string(),
///     block_time: "8:20".to_string(),
///     aircraft_category: AircraftCategory::LongHaul,
///     country: None,
///     is_continuation: false,
/// };
/// assert!(flight.is_overnight().unwrap());
/// assert_eq!(flight.arrival_display().unwrap(), "06:30+1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    /// The departure date.
    pub date: NaiveDate,
    /// IATA code of the departure airport.
    pub departure: String,
    /// IATA code of the arrival airport.
    pub arrival: String,
    /// Local departure time (HH:MM).
    pub departure_time: String,
    /// Local arrival time (HH:MM), possibly on the next day.
    pub arrival_time: String,
    /// Roster duty code.
    pub duty_code: String,
    /// Flight number.
    pub flight_number: String,
    /// Block time (H:MM).
    pub block_time: String,
    /// Aircraft or operation category.
    pub aircraft_category: AircraftCategory,
    /// Destination country code, if the parser already resolved it.
    #[serde(default)]
    pub country: Option<String>,
    /// True when this leg continues the duty of the previous leg.
    #[serde(default)]
    pub is_continuation: bool,
}

impl Flight {
    /// Identifies the flight in error messages.
    pub fn describe(&self) -> String {
        format!("flight {} on {}", self.flight_number, self.date)
    }

    /// Returns true when the arrival clock time is earlier than the departure
    /// clock time.
    pub fn is_overnight(&self) -> Result<bool, String> {
        let departure: ClockTime = self.departure_time.parse()?;
        let arrival: ClockTime = self.arrival_time.parse()?;
        Ok(arrival < departure)
    }

    /// Renders the arrival time for export, suffixing `+1` for overnight flights.
    pub fn arrival_display(&self) -> Result<String, String> {
        let arrival: ClockTime = self.arrival_time.parse()?;
        if self.is_overnight()? {
            Ok(format!("{}+1", arrival))
        } else {
            Ok(arrival.to_string())
        }
    }
}

/// A non-flying duty day such as ground duty, a medical or a simulator session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonFlightDay {
    /// The date of the duty.
    pub date: NaiveDate,
    /// The duty type.
    pub duty_type: DutyType,
    /// Free-text description from the roster.
    #[serde(default)]
    pub description: String,
    /// Country where the duty takes place; `None` means domestic.
    #[serde(default)]
    pub country: Option<String>,
    /// Local duty start time (HH:MM), when the roster records one.
    #[serde(default)]
    pub start_time: Option<String>,
    /// Local duty end time (HH:MM), when the roster records one.
    #[serde(default)]
    pub end_time: Option<String>,
}

impl NonFlightDay {
    /// Identifies the duty day in error messages.
    pub fn describe(&self) -> String {
        format!("{} duty on {}", self.duty_type, self.date)
    }
}

/// One roster entry: either a flight leg or a non-flying duty day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DutyRecord {
    /// A flight leg.
    Flight(Flight),
    /// A non-flying duty day.
    NonFlightDay(NonFlightDay),
}

impl DutyRecord {
    /// The calendar date the record is filed under.
    pub fn date(&self) -> NaiveDate {
        match self {
            DutyRecord::Flight(flight) => flight.date,
            DutyRecord::NonFlightDay(day) => day.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_flight(departure_time: &str, arrival_time: &str) -> Flight {
        Flight {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            departure: "FRA".to_string(),
            arrival: "JFK".to_string(),
            departure_time: departure_time.to_string(),
            arrival_time: arrival_time.to_string(),
            duty_code: "FL".to_string(),
            flight_number: "LH400".to_string(),
            block_time: "8:45".to_string(),
            aircraft_category: AircraftCategory::LongHaul,
            country: None,
            is_continuation: false,
        }
    }

    #[test]
    fn test_clock_time_parses_valid_times() {
        assert_eq!("00:00".parse::<ClockTime>().unwrap().minutes(), 0);
        assert_eq!("23:59".parse::<ClockTime>().unwrap().minutes(), 1439);
        assert_eq!("7:05".parse::<ClockTime>().unwrap().minutes(), 425);
    }

    #[test]
    fn test_clock_time_rejects_malformed_times() {
        for bad in ["", "12", "24:00", "12:60", "12:5", "ab:cd", "-1:00", "12:00:00"] {
            assert!(bad.parse::<ClockTime>().is_err(), "accepted '{}'", bad);
        }
    }

    #[test]
    fn test_clock_time_from_minutes_bounds() {
        assert!(ClockTime::from_minutes(1439).is_some());
        assert!(ClockTime::from_minutes(1440).is_none());
    }

    #[test]
    fn test_duration_allows_long_blocks() {
        assert_eq!(parse_duration_minutes("13:45"), Ok(825));
        assert_eq!(parse_duration_minutes("0:50"), Ok(50));
        assert!(parse_duration_minutes("1:75").is_err());
    }

    #[test]
    fn test_duration_rejects_hours_beyond_minute_range() {
        assert!(parse_duration_minutes("99999999:00").is_err());
        assert!(parse_duration_minutes("99999999999:00").is_err());
        assert_eq!(parse_duration_minutes("71582788:15"), Ok(4_294_967_295));
    }

    #[test]
    fn test_overnight_flight_detected() {
        let flight = make_flight("22:10", "06:30");
        assert!(flight.is_overnight().unwrap());
        assert_eq!(flight.arrival_display().unwrap(), "06:30+1");
    }

    #[test]
    fn test_same_day_flight_display() {
        let flight = make_flight("10:05", "12:50");
        assert!(!flight.is_overnight().unwrap());
        assert_eq!(flight.arrival_display().unwrap(), "12:50");
    }

    #[test]
    fn test_flight_deserializes_from_camel_case() {
        let json = serde_json::json!({
            "date": "2024-03-01",
            "departure": "FRA",
            "arrival": "MUC",
            "departureTime": "07:00",
            "arrivalTime": "08:05",
            "dutyCode": "FL",
            "flightNumber": "LH100",
            "blockTime": "1:05",
            "aircraftCategory": "short_haul_cabin"
        });
        let flight: Flight = serde_json::from_value(json).unwrap();
        assert_eq!(flight.aircraft_category, AircraftCategory::ShortHaulCabin);
        assert!(!flight.is_continuation);
        assert_eq!(flight.country, None);
    }

    #[test]
    fn test_unknown_duty_type_maps_to_other() {
        let day: NonFlightDay = serde_json::from_value(serde_json::json!({
            "date": "2024-03-02",
            "dutyType": "crm_workshop"
        }))
        .unwrap();
        assert_eq!(day.duty_type, DutyType::Other);
        assert_eq!(day.country, None);
    }

    #[test]
    fn test_flat_rate_ground_duty_codes() {
        assert!(DutyType::Medical.is_flat_rate_ground_duty());
        assert!(DutyType::Standby.is_flat_rate_ground_duty());
        assert!(DutyType::EmergencyMedical.is_flat_rate_ground_duty());
        assert!(!DutyType::Simulator.is_flat_rate_ground_duty());
        assert!(!DutyType::Office.is_flat_rate_ground_duty());
    }

    #[test]
    fn test_duty_record_date() {
        let record = DutyRecord::Flight(make_flight("10:00", "12:00"));
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
