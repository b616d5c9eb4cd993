//! The calculation entry point.
//!
//! [`calculate_tax`] runs every calculator over one set of duty records and
//! assembles the [`TaxReport`]. It is a pure function of its inputs.

use chrono::NaiveDate;

use crate::config::ReferenceData;
use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, DailyAllowanceInfo, DutyRecord, Flight, NonFlightDay,
    Settings, TaxCalculation, TaxReport,
};

use super::absence::{calculate_trip_absence, ground_day_absence};
use super::cleaning_costs::calculate_cleaning_costs;
use super::duty_time::{TimedFlight, TimedGroundDay, time_flight, time_ground_day};
use super::meal_allowance::{aggregate_meal_allowances, select_daily_allowances};
use super::monthly::{MonthlyInputs, aggregate_monthly};
use super::rate_resolver::{resolve_ground_day_rate, resolve_trip_day_rate};
use super::travel_costs::calculate_travel_costs;
use super::travel_expenses::calculate_travel_expenses;
use super::trips::build_trips;
use super::workdays::determine_workdays;

/// The version of the engine embedded in every report.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

struct TraceBuilder {
    trace: AuditTrace,
}

impl TraceBuilder {
    fn new() -> Self {
        Self {
            trace: AuditTrace::default(),
        }
    }

    fn next_step(&self) -> u32 {
        u32::try_from(self.trace.steps.len() + 1).unwrap_or(u32::MAX)
    }

    fn push(&mut self, step: AuditStep) {
        self.trace.steps.push(step);
    }

    fn warn(&mut self, warning: Option<AuditWarning>) {
        self.trace.warnings.extend(warning);
    }
}

/// Calculates the deduction report for a roster.
///
/// # Arguments
///
/// * `flights` - Flight legs, in any order
/// * `non_flight_days` - Non-flying duty days; their order decides which of
///   several records on one date yields the allowance
/// * `settings` - User settings
/// * `reference` - Airport and rate tables
///
/// # Errors
///
/// Returns [`crate::error::EngineError::MalformedDutyRecord`] for a record
/// with an unparsable time. Missing reference data never fails the
/// calculation; it yields audit warnings instead.
///
/// # Example
///
/// ```no_run
/// use crew_tax_engine::calculation::calculate_tax;
/// use crew_tax_engine::config::ConfigLoader;
///
/// let config = ConfigLoader::load("./config/de").unwrap();
/// let report = calculate_tax(&[], &[], config.default_settings(), config.tables()).unwrap();
/// assert!(report.monthly_breakdown.is_empty());
/// ```
pub fn calculate_tax<R: ReferenceData + ?Sized>(
    flights: &[Flight],
    non_flight_days: &[NonFlightDay],
    settings: &Settings,
    reference: &R,
) -> EngineResult<TaxReport> {
    let timed_flights: Vec<TimedFlight<'_>> =
        flights.iter().map(time_flight).collect::<EngineResult<_>>()?;
    let timed_days: Vec<TimedGroundDay<'_>> = non_flight_days
        .iter()
        .map(time_ground_day)
        .collect::<EngineResult<_>>()?;

    let mut trace = TraceBuilder::new();

    let workdays = determine_workdays(flights, non_flight_days, settings, trace.next_step());
    trace.push(workdays.audit_step);

    let trips = build_trips(timed_flights.clone(), timed_days);

    // Candidates per date: the flight-derived trip day, then non-flight days
    // in input order.
    let mut candidates: Vec<(NaiveDate, Option<DailyAllowanceInfo>)> = Vec::new();
    for trip in &trips {
        let absence = calculate_trip_absence(trip, settings, reference, trace.next_step());
        trace.push(absence.audit_step);

        for day in &absence.days {
            if day.location.is_some() {
                let resolved = resolve_trip_day_rate(day, reference, trace.next_step());
                trace.push(resolved.audit_step);
                trace.warn(resolved.warning);
                candidates.push((day.date, resolved.allowance));
            }
            for ground in trip.ground_days_on(day.date) {
                let minutes = ground_day_absence(ground, settings);
                let resolved = resolve_ground_day_rate(
                    ground,
                    minutes,
                    settings,
                    reference,
                    trace.next_step(),
                );
                trace.push(resolved.audit_step);
                trace.warn(resolved.warning);
                candidates.push((day.date, resolved.allowance));
            }
        }
    }
    let daily_allowances = select_daily_allowances(candidates);

    let meals = aggregate_meal_allowances(
        &daily_allowances,
        settings.employer_reimbursement,
        trace.next_step(),
    );
    trace.push(meals.audit_step);
    trace.warn(meals.warning);

    let travel = calculate_travel_costs(
        &workdays.commute_days,
        settings,
        reference,
        trace.next_step(),
    );
    trace.push(travel.audit_step);
    trace.warn(travel.warning);

    let work_day_count = u32::try_from(workdays.work_days.len()).unwrap_or(u32::MAX);
    let cleaning = calculate_cleaning_costs(
        work_day_count,
        settings.cleaning_cost_per_day,
        trace.next_step(),
    );
    trace.push(cleaning.audit_step);

    let expenses = calculate_travel_expenses(&trips, settings.tip_rate_per_night, trace.next_step());
    trace.push(expenses.audit_step);

    let trip_starts: Vec<NaiveDate> = trips.iter().map(|t| t.start).collect();
    let monthly = aggregate_monthly(
        MonthlyInputs {
            flights: &timed_flights,
            trip_starts: &trip_starts,
            work_days: &workdays.work_days,
            daily_allowances: &daily_allowances,
            commute_deductions: &travel.per_day,
            hotel_nights: &expenses.nights,
            cleaning_rate: settings.cleaning_cost_per_day,
            tip_rate: settings.tip_rate_per_night,
        },
        trace.next_step(),
    );
    trace.push(monthly.audit_step);

    let grand_total = meals.meal_allowances.difference
        + travel.travel_costs.total
        + cleaning.cleaning_costs.total
        + expenses.travel_expenses.total;

    tracing::debug!(
        flights = flights.len(),
        non_flight_days = non_flight_days.len(),
        trips = trips.len(),
        allowance_days = daily_allowances.len(),
        grand_total = %grand_total,
        "Calculated deductions"
    );

    Ok(TaxReport {
        engine_version: ENGINE_VERSION.to_string(),
        tax_calculation: TaxCalculation {
            meal_allowances: meals.meal_allowances,
            travel_costs: travel.travel_costs,
            cleaning_costs: cleaning.cleaning_costs,
            travel_expenses: expenses.travel_expenses,
            grand_total,
        },
        monthly_breakdown: monthly.months,
        daily_allowances,
        audit_trace: trace.trace,
    })
}

/// Calculates the deduction report for a mixed list of duty records.
///
/// Records keep their relative order within each kind.
pub fn calculate_tax_for_records<R: ReferenceData + ?Sized>(
    records: &[DutyRecord],
    settings: &Settings,
    reference: &R,
) -> EngineResult<TaxReport> {
    let mut flights = Vec::new();
    let mut non_flight_days = Vec::new();
    for record in records {
        match record {
            DutyRecord::Flight(flight) => flights.push(flight.clone()),
            DutyRecord::NonFlightDay(day) => non_flight_days.push(day.clone()),
        }
    }
    calculate_tax(&flights, &non_flight_days, settings, reference)
}
