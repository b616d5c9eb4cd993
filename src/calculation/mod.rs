//! Calculation logic for the Crew Tax Engine.
//!
//! This module contains every rule of the deduction calculation: duty time
//! parsing, trip building and trip-day classification, absence measurement,
//! per-diem rate resolution, meal allowance aggregation, workday rules, the
//! tiered commute deduction, flat cleaning costs, hotel tips and the monthly
//! breakdown. [`calculate_tax`] runs them all.

mod absence;
mod cleaning_costs;
mod duty_time;
mod engine;
mod meal_allowance;
mod monthly;
mod rate_resolver;
mod travel_costs;
mod travel_expenses;
mod trips;
mod workdays;

pub use absence::{
    ABSENCE_LEGAL_REF, DayAbsence, DayLocation, TripAbsenceResult, calculate_trip_absence,
    day_trip_minutes, ground_day_absence,
};
pub use cleaning_costs::{CLEANING_COSTS_LEGAL_REF, CleaningCostResult, calculate_cleaning_costs};
pub use duty_time::{
    DEBRIEFING_MINUTES, LONG_HAUL_BRIEFING_MINUTES, SHORT_HAUL_CABIN_BRIEFING_MINUTES,
    SHORT_HAUL_COCKPIT_BRIEFING_MINUTES, SIMULATOR_BRIEFING_MINUTES, TimedFlight, TimedGroundDay,
    briefing_minutes, commute_minutes, post_flight_minutes, time_flight, time_ground_day,
};
pub use engine::{ENGINE_VERSION, calculate_tax, calculate_tax_for_records};
pub use meal_allowance::{
    MealAllowanceResult, REIMBURSEMENT_EXCEEDS_ALLOWANCES, aggregate_meal_allowances,
    select_daily_allowances,
};
pub use monthly::{MonthlyAggregationResult, MonthlyInputs, aggregate_monthly};
pub use rate_resolver::{
    MEAL_ALLOWANCE_LEGAL_REF, PARTIAL_RATE_THRESHOLD_MINUTES, RateResolutionResult,
    resolve_ground_day_rate, resolve_trip_day_rate,
};
pub use travel_costs::{
    COMMUTE_RATES_NOT_FOUND, CommuteDeduction, TRAVEL_COSTS_LEGAL_REF, TravelCostResult,
    calculate_travel_costs, commute_deduction,
};
pub use travel_expenses::{TravelExpenseResult, calculate_travel_expenses, hotel_nights};
pub use trips::{Trip, Whereabouts, build_trips, classify_trip_days};
pub use workdays::{WorkdayResult, determine_workdays};
