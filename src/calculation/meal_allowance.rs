//! Meal allowance aggregation.
//!
//! Keeps one allowance per calendar date, sums the allowances per country and
//! subtracts the employer's tax-free reimbursement.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    AuditStep, AuditWarning, CountryAllowance, DailyAllowanceInfo, MealAllowances, RateType,
};

use super::rate_resolver::MEAL_ALLOWANCE_LEGAL_REF;

/// Warning code for a reimbursement larger than the allowances.
pub const REIMBURSEMENT_EXCEEDS_ALLOWANCES: &str = "REIMBURSEMENT_EXCEEDS_ALLOWANCES";

/// The result of aggregating meal allowances, including the audit step.
#[derive(Debug, Clone)]
pub struct MealAllowanceResult {
    /// The aggregated meal allowances.
    pub meal_allowances: MealAllowances,
    /// Set when the deductible difference is negative.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Builds the per-date allowance map from candidates in priority order.
///
/// The first candidate with an allowance wins its date; later candidates for
/// the same date are ignored.
///
/// # Example
///
/// ```
/// use crew_tax_engine::calculation::select_daily_allowances;
/// use crew_tax_engine::models::{DailyAllowanceInfo, RateType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// let allowance = |rate: i64| DailyAllowanceInfo {
///     rate: Decimal::new(rate, 0),
///     rate_type: RateType::Partial,
///     country: "DE".to_string(),
/// };
///
/// let daily = select_daily_allowances(vec![
///     (date, None),
///     (date, Some(allowance(14))),
///     (date, Some(allowance(40))),
/// ]);
/// assert_eq!(daily.len(), 1);
/// assert_eq!(daily[&date].rate, Decimal::new(14, 0));
/// ```
pub fn select_daily_allowances<I>(candidates: I) -> BTreeMap<NaiveDate, DailyAllowanceInfo>
where
    I: IntoIterator<Item = (NaiveDate, Option<DailyAllowanceInfo>)>,
{
    let mut daily = BTreeMap::new();
    for (date, allowance) in candidates {
        if let Some(allowance) = allowance {
            daily.entry(date).or_insert(allowance);
        }
    }
    daily
}

/// Aggregates per-date allowances into totals.
///
/// # Arguments
///
/// * `daily` - One allowance per date
/// * `employer_reimbursement` - Tax-free meal reimbursement already paid
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// A `MealAllowanceResult` whose by-country breakdown is sorted by country
/// code. A negative difference is reported unchanged and flagged with a
/// warning.
pub fn aggregate_meal_allowances(
    daily: &BTreeMap<NaiveDate, DailyAllowanceInfo>,
    employer_reimbursement: Decimal,
    step_number: u32,
) -> MealAllowanceResult {
    let mut by_country: BTreeMap<&str, CountryAllowance> = BTreeMap::new();

    for info in daily.values() {
        let entry = by_country
            .entry(info.country.as_str())
            .or_insert_with(|| CountryAllowance {
                country: info.country.clone(),
                partial_days: 0,
                partial_total: Decimal::ZERO,
                full_days: 0,
                full_total: Decimal::ZERO,
                total: Decimal::ZERO,
            });
        match info.rate_type {
            RateType::Partial => {
                entry.partial_days += 1;
                entry.partial_total += info.rate;
            }
            RateType::Full => {
                entry.full_days += 1;
                entry.full_total += info.rate;
            }
        }
        entry.total += info.rate;
    }

    let by_country: Vec<CountryAllowance> = by_country.into_values().collect();
    let total: Decimal = by_country.iter().map(|c| c.total).sum();
    let difference = total - employer_reimbursement;

    let warning = (difference < Decimal::ZERO).then(|| {
        tracing::warn!(
            total = %total,
            employer_reimbursement = %employer_reimbursement,
            "Employer reimbursement exceeds meal allowances"
        );
        AuditWarning::new(
            REIMBURSEMENT_EXCEEDS_ALLOWANCES,
            format!(
                "Employer reimbursement €{} exceeds meal allowances €{}; difference €{} reported unclamped",
                employer_reimbursement.normalize(),
                total.normalize(),
                difference.normalize()
            ),
            "high",
        )
    });

    let audit_step = AuditStep {
        step_number,
        rule_id: "meal_allowance_total".to_string(),
        rule_name: "Meal Allowance Aggregation".to_string(),
        legal_ref: MEAL_ALLOWANCE_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "days": daily.len(),
            "employer_reimbursement": employer_reimbursement.normalize().to_string(),
        }),
        output: serde_json::json!({
            "total": total.normalize().to_string(),
            "difference": difference.normalize().to_string(),
            "countries": by_country.len(),
        }),
        reasoning: format!(
            "{} allowance day(s) in {} countr{} = €{}, minus reimbursement €{} = €{}",
            daily.len(),
            by_country.len(),
            if by_country.len() == 1 { "y" } else { "ies" },
            total.normalize(),
            employer_reimbursement.normalize(),
            difference.normalize()
        ),
    };

    MealAllowanceResult {
        meal_allowances: MealAllowances {
            total,
            employer_reimbursement,
            difference,
            by_country,
        },
        warning,
        audit_step,
    }
}
