//! Monthly aggregation.
//!
//! Rolls the per-date results of the other calculators up into one
//! [`MonthlyBreakdown`] per calendar month with activity.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{AuditStep, DailyAllowanceInfo, MonthlyBreakdown};

use super::duty_time::TimedFlight;

/// Per-date inputs to the monthly aggregation.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyInputs<'r, 'a> {
    /// All flights; block time counts in the month of departure.
    pub flights: &'r [TimedFlight<'a>],
    /// First date of every trip.
    pub trip_starts: &'r [NaiveDate],
    /// Workdays.
    pub work_days: &'r BTreeSet<NaiveDate>,
    /// The allowance granted per date.
    pub daily_allowances: &'r BTreeMap<NaiveDate, DailyAllowanceInfo>,
    /// The commute deduction earned per date.
    pub commute_deductions: &'r BTreeMap<NaiveDate, Decimal>,
    /// Dates starting a hotel night.
    pub hotel_nights: &'r BTreeSet<NaiveDate>,
    /// Cleaning cost per workday.
    pub cleaning_rate: Decimal,
    /// Tip per hotel night.
    pub tip_rate: Decimal,
}

/// The result of the monthly aggregation, including the audit step.
#[derive(Debug, Clone)]
pub struct MonthlyAggregationResult {
    /// One entry per month with activity, in chronological order.
    pub months: Vec<MonthlyBreakdown>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

#[derive(Default)]
struct MonthAccumulator {
    block_minutes: u64,
    work_days: u32,
    trips: u32,
    meal_allowances: Decimal,
    travel_costs: Decimal,
    hotel_nights: u32,
}

/// Groups per-date results by calendar month.
///
/// Category totals are sums of the same per-date amounts the grand totals
/// are built from, so summing a category over all months reproduces the
/// grand figure exactly.
pub fn aggregate_monthly(inputs: MonthlyInputs<'_, '_>, step_number: u32) -> MonthlyAggregationResult {
    let mut months: BTreeMap<(i32, u32), MonthAccumulator> = BTreeMap::new();
    let month_of = |date: NaiveDate| (date.year(), date.month());

    for flight in inputs.flights {
        months
            .entry(month_of(flight.departure_date()))
            .or_default()
            .block_minutes += u64::from(flight.block_minutes);
    }
    for &start in inputs.trip_starts {
        months.entry(month_of(start)).or_default().trips += 1;
    }
    for &date in inputs.work_days {
        months.entry(month_of(date)).or_default().work_days += 1;
    }
    for (&date, info) in inputs.daily_allowances {
        months.entry(month_of(date)).or_default().meal_allowances += info.rate;
    }
    for (&date, amount) in inputs.commute_deductions {
        months.entry(month_of(date)).or_default().travel_costs += *amount;
    }
    for &date in inputs.hotel_nights {
        months.entry(month_of(date)).or_default().hotel_nights += 1;
    }

    let months: Vec<MonthlyBreakdown> = months
        .into_iter()
        .map(|((year, month), acc)| {
            let cleaning_costs = Decimal::from(acc.work_days) * inputs.cleaning_rate;
            let travel_expenses = Decimal::from(acc.hotel_nights) * inputs.tip_rate;
            MonthlyBreakdown {
                year,
                month,
                flight_hours: (Decimal::from(acc.block_minutes) / Decimal::from(60))
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                work_days: acc.work_days,
                trips: acc.trips,
                meal_allowances: acc.meal_allowances,
                travel_costs: acc.travel_costs,
                cleaning_costs,
                travel_expenses,
                total: acc.meal_allowances + acc.travel_costs + cleaning_costs + travel_expenses,
            }
        })
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "monthly_breakdown".to_string(),
        rule_name: "Monthly Breakdown".to_string(),
        legal_ref: "§ 9 EStG".to_string(),
        input: serde_json::json!({
            "flights": inputs.flights.len(),
            "trips": inputs.trip_starts.len(),
            "allowance_days": inputs.daily_allowances.len(),
        }),
        output: serde_json::json!({
            "months": months
                .iter()
                .map(|m| format!("{:04}-{:02}", m.year, m.month))
                .collect::<Vec<_>>(),
        }),
        reasoning: format!("Aggregated activity into {} month(s)", months.len()),
    };

    MonthlyAggregationResult { months, audit_step }
}
