//! Workday and commute-day rules.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::{AuditStep, Flight, NonFlightDay, Settings};

/// The result of determining workdays, including the audit step.
#[derive(Debug, Clone)]
pub struct WorkdayResult {
    /// Dates counted for cleaning costs.
    pub work_days: BTreeSet<NaiveDate>,
    /// Dates on which the crew commutes to the home base.
    pub commute_days: BTreeSet<NaiveDate>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Determines workdays and commute days.
///
/// Every flight date is both a workday and a commute day. A non-flight date
/// is a workday when its duty type is listed in the settings, and also a
/// commute day when ground duties count as commutes.
pub fn determine_workdays(
    flights: &[Flight],
    non_flight_days: &[NonFlightDay],
    settings: &Settings,
    step_number: u32,
) -> WorkdayResult {
    let flight_dates: BTreeSet<NaiveDate> = flights.iter().map(|f| f.date).collect();
    let ground_work_dates: BTreeSet<NaiveDate> = non_flight_days
        .iter()
        .filter(|d| settings.counts_as_workday(d.duty_type))
        .map(|d| d.date)
        .collect();

    let work_days: BTreeSet<NaiveDate> = flight_dates.union(&ground_work_dates).copied().collect();
    let commute_days: BTreeSet<NaiveDate> = if settings.count_ground_duty_as_commute {
        work_days.clone()
    } else {
        flight_dates.clone()
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "workdays".to_string(),
        rule_name: "Workday Determination".to_string(),
        legal_ref: "§ 9 Abs. 1 Satz 3 Nr. 4 EStG".to_string(),
        input: serde_json::json!({
            "flight_dates": flight_dates.len(),
            "non_flight_days": non_flight_days.len(),
            "workday_duty_types": settings.workday_duty_types,
            "count_ground_duty_as_commute": settings.count_ground_duty_as_commute,
        }),
        output: serde_json::json!({
            "work_days": work_days.len(),
            "commute_days": commute_days.len(),
        }),
        reasoning: format!(
            "{} flight date(s) and {} ground workday date(s) give {} workday(s) and {} commute day(s)",
            flight_dates.len(),
            ground_work_dates.len(),
            work_days.len(),
            commute_days.len()
        ),
    };

    WorkdayResult {
        work_days,
        commute_days,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, flight, ground_day, settings};
    use crate::models::{AircraftCategory, DutyType};

    fn roster() -> (Vec<Flight>, Vec<NonFlightDay>) {
        let flights = vec![
            flight("2024-03-01", "FRA", "LHR", "07:00", "07:45", "1:45", AircraftCategory::ShortHaulCabin),
            flight("2024-03-01", "LHR", "FRA", "09:00", "11:40", "1:40", AircraftCategory::ShortHaulCabin),
            flight("2024-03-02", "FRA", "MUC", "07:00", "08:00", "1:00", AircraftCategory::ShortHaulCabin),
        ];
        let days = vec![
            ground_day("2024-03-04", DutyType::Medical),
            ground_day("2024-03-05", DutyType::Other),
            ground_day("2024-03-02", DutyType::Office),
        ];
        (flights, days)
    }

    #[test]
    fn test_workdays_are_distinct_dates() {
        let (flights, days) = roster();
        let result = determine_workdays(&flights, &days, &settings("20"), 1);
        let expected: BTreeSet<NaiveDate> =
            [date("2024-03-01"), date("2024-03-02"), date("2024-03-04")].into();
        assert_eq!(result.work_days, expected);
        assert_eq!(result.commute_days, expected);
    }

    #[test]
    fn test_ground_duty_commutes_can_be_disabled() {
        let (flights, days) = roster();
        let mut config = settings("20");
        config.count_ground_duty_as_commute = false;
        let result = determine_workdays(&flights, &days, &config, 1);
        assert_eq!(result.work_days.len(), 3);
        assert_eq!(result.commute_days.len(), 2);
    }

    #[test]
    fn test_workday_types_are_configurable() {
        let (flights, days) = roster();
        let mut config = settings("20");
        config.workday_duty_types = vec![DutyType::Other];
        let result = determine_workdays(&flights, &days, &config, 1);
        assert!(result.work_days.contains(&date("2024-03-05")));
        assert!(!result.work_days.contains(&date("2024-03-04")));
    }
}
