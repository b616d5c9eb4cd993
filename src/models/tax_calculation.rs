//! Calculation result models for the Crew Tax Engine.
//!
//! This module contains the [`TaxReport`] type and the structures nested in it:
//! the grand [`TaxCalculation`], the per-month [`MonthlyBreakdown`], the per-date
//! [`DailyAllowanceInfo`] map and the [`AuditTrace`].
//!
//! JSON field names of [`TaxCalculation`] are consumed verbatim by the report
//! generators and must not change.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The per-diem tier of a daily allowance.
///
/// # Example
///
/// ```
/// use crew_tax_engine::models::RateType;
///
/// assert_eq!(serde_json::to_string(&RateType::Partial).unwrap(), "\"partial\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// Absence over 8 hours, or the departure/arrival day of a multi-day trip.
    Partial,
    /// A calendar day spent entirely abroad.
    Full,
}

/// The role a calendar date plays within its trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripDayRole {
    /// The only date of a day trip.
    SingleDay,
    /// The first date of a multi-day trip.
    DepartureDay,
    /// A date strictly between departure and arrival.
    IntermediateDay,
    /// The last date of a multi-day trip.
    ArrivalDay,
}

impl std::fmt::Display for TripDayRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripDayRole::SingleDay => write!(f, "single-day"),
            TripDayRole::DepartureDay => write!(f, "departure-day"),
            TripDayRole::IntermediateDay => write!(f, "intermediate-day"),
            TripDayRole::ArrivalDay => write!(f, "arrival-day"),
        }
    }
}

/// The allowance granted for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAllowanceInfo {
    /// The allowance amount.
    pub rate: Decimal,
    /// The tier the amount was taken from.
    pub rate_type: RateType,
    /// Country code the rate belongs to.
    pub country: String,
}

/// Meal allowances accumulated for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryAllowance {
    /// Country code.
    pub country: String,
    /// Number of partial-rate days.
    pub partial_days: u32,
    /// Sum of partial-rate allowances.
    pub partial_total: Decimal,
    /// Number of full-rate days.
    pub full_days: u32,
    /// Sum of full-rate allowances.
    pub full_total: Decimal,
    /// Partial plus full total.
    pub total: Decimal,
}

/// Meal allowance summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAllowances {
    /// Gross allowances over all dates.
    pub total: Decimal,
    /// Tax-free reimbursement paid by the employer.
    pub employer_reimbursement: Decimal,
    /// Deductible difference (total minus reimbursement); may be negative.
    pub difference: Decimal,
    /// Breakdown per country, ordered by country code.
    pub by_country: Vec<CountryAllowance>,
}

/// Commute (distance allowance) summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelCosts {
    /// Number of commute trips.
    pub trips: u32,
    /// Trips times one-way distance.
    pub total_km: Decimal,
    /// Deduction earned by the first 20 km of every trip.
    pub rate_first_20km: Decimal,
    /// Deduction earned by the kilometres beyond 20 of every trip.
    pub rate_above_20km: Decimal,
    /// Total commute deduction.
    pub total: Decimal,
}

/// Flat cleaning cost summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningCosts {
    /// Number of workdays.
    pub work_days: u32,
    /// Rate per workday.
    pub rate_per_day: Decimal,
    /// Total cleaning cost.
    pub total: Decimal,
}

/// Travel expenses (hotel tips) summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelExpenses {
    /// Number of hotel nights.
    pub hotel_nights: u32,
    /// Tip amount per night.
    pub tip_rate: Decimal,
    /// Total travel expenses.
    pub total: Decimal,
}

/// The grand aggregate of all deductions.
///
/// # Example
///
/// ```
/// use crew_tax_engine::models::TaxCalculation;
/// use rust_decimal::Decimal;
///
/// let empty = TaxCalculation::empty(Decimal::ZERO, Decimal::new(160, 2), Decimal::new(360, 2));
/// let json = serde_json::to_value(&empty).unwrap();
/// assert!(json["mealAllowances"]["byCountry"].is_array());
/// assert!(json["travelCosts"]["rateFirst20km"].is_string());
/// assert_eq!(json["grandTotal"], "0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculation {
    /// Meal allowances.
    pub meal_allowances: MealAllowances,
    /// Commute deduction.
    pub travel_costs: TravelCosts,
    /// Flat cleaning costs.
    pub cleaning_costs: CleaningCosts,
    /// Hotel tips.
    pub travel_expenses: TravelExpenses,
    /// Sum of the deductible meal difference, travel costs, cleaning costs and
    /// travel expenses.
    pub grand_total: Decimal,
}

impl TaxCalculation {
    /// A calculation with every aggregate zero, as produced for an empty roster.
    pub fn empty(
        employer_reimbursement: Decimal,
        cleaning_rate: Decimal,
        tip_rate: Decimal,
    ) -> Self {
        let difference = Decimal::ZERO - employer_reimbursement;
        Self {
            meal_allowances: MealAllowances {
                total: Decimal::ZERO,
                employer_reimbursement,
                difference,
                by_country: vec![],
            },
            travel_costs: TravelCosts {
                trips: 0,
                total_km: Decimal::ZERO,
                rate_first_20km: Decimal::ZERO,
                rate_above_20km: Decimal::ZERO,
                total: Decimal::ZERO,
            },
            cleaning_costs: CleaningCosts {
                work_days: 0,
                rate_per_day: cleaning_rate,
                total: Decimal::ZERO,
            },
            travel_expenses: TravelExpenses {
                hotel_nights: 0,
                tip_rate,
                total: Decimal::ZERO,
            },
            grand_total: difference,
        }
    }
}

/// Deductions and activity for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Block hours flown, rounded to two decimals.
    pub flight_hours: Decimal,
    /// Workdays in the month.
    pub work_days: u32,
    /// Trips starting in the month.
    pub trips: u32,
    /// Gross meal allowances.
    pub meal_allowances: Decimal,
    /// Commute deduction.
    pub travel_costs: Decimal,
    /// Cleaning costs.
    pub cleaning_costs: Decimal,
    /// Hotel tips.
    pub travel_expenses: Decimal,
    /// Sum of the four categories.
    pub total: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The statutory provision behind the rule.
    pub legal_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(code: &str, message: impl Into<String>, severity: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// Everything the engine produces for one input set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxReport {
    /// The version of the engine that produced the report.
    pub engine_version: String,
    /// The grand aggregate.
    pub tax_calculation: TaxCalculation,
    /// One entry per month with activity, in chronological order.
    pub monthly_breakdown: Vec<MonthlyBreakdown>,
    /// The allowance granted per date.
    pub daily_allowances: BTreeMap<NaiveDate, DailyAllowanceInfo>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_rate_type_serialization() {
        assert_eq!(serde_json::to_string(&RateType::Full).unwrap(), "\"full\"");
        let parsed: RateType = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(parsed, RateType::Partial);
    }

    #[test]
    fn test_trip_day_role_serialization_matches_display() {
        for role in [
            TripDayRole::SingleDay,
            TripDayRole::DepartureDay,
            TripDayRole::IntermediateDay,
            TripDayRole::ArrivalDay,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role));
        }
    }

    #[test]
    fn test_travel_costs_field_names() {
        let costs = TravelCosts {
            trips: 1,
            total_km: dec("25"),
            rate_first_20km: dec("6.00"),
            rate_above_20km: dec("1.90"),
            total: dec("7.90"),
        };
        let json = serde_json::to_value(&costs).unwrap();
        assert_eq!(json["trips"], 1);
        assert_eq!(json["totalKm"], "25");
        assert_eq!(json["rateFirst20km"], "6.00");
        assert_eq!(json["rateAbove20km"], "1.90");
        assert_eq!(json["total"], "7.90");
    }

    #[test]
    fn test_cleaning_and_expense_field_names() {
        let calculation = TaxCalculation::empty(dec("0"), dec("1.60"), dec("3.60"));
        let json = serde_json::to_value(&calculation).unwrap();
        assert_eq!(json["cleaningCosts"]["workDays"], 0);
        assert_eq!(json["cleaningCosts"]["ratePerDay"], "1.60");
        assert_eq!(json["travelExpenses"]["hotelNights"], 0);
        assert_eq!(json["travelExpenses"]["tipRate"], "3.60");
        assert_eq!(json["mealAllowances"]["employerReimbursement"], "0");
    }

    #[test]
    fn test_empty_calculation_carries_reimbursement_as_negative_difference() {
        let calculation = TaxCalculation::empty(dec("50"), dec("1.60"), dec("3.60"));
        assert_eq!(calculation.meal_allowances.difference, dec("-50"));
        assert_eq!(calculation.grand_total, dec("-50"));
    }

    #[test]
    fn test_daily_allowance_map_serializes_with_date_keys() {
        let mut daily = BTreeMap::new();
        daily.insert(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            DailyAllowanceInfo {
                rate: dec("14"),
                rate_type: RateType::Partial,
                country: "DE".to_string(),
            },
        );
        let json = serde_json::to_value(&daily).unwrap();
        assert_eq!(json["2024-03-01"]["rateType"], "partial");
        assert_eq!(json["2024-03-01"]["rate"], "14");
    }
}
