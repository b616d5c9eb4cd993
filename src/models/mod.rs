//! Core data models for the Crew Tax Engine.
//!
//! This module contains all the domain models used throughout the engine:
//! the duty records coming from the roster parser, the user settings, and
//! the report structures handed to export and UI collaborators.

mod duty;
mod settings;
mod tax_calculation;

pub use duty::{
    AircraftCategory, ClockTime, DutyRecord, DutyType, Flight, MINUTES_PER_DAY, NonFlightDay,
    parse_duration_minutes,
};
pub use settings::{Settings, SettingsOverrides};
pub use tax_calculation::{
    AuditStep, AuditTrace, AuditWarning, CleaningCosts, CountryAllowance, DailyAllowanceInfo,
    MealAllowances, MonthlyBreakdown, RateType, TaxCalculation, TaxReport, TravelCosts,
    TravelExpenses, TripDayRole,
};
