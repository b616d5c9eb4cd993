//! Commute distance deduction.
//!
//! Every commute day earns the first-tier rate on the kilometres up to the
//! tier threshold and the second-tier rate on the kilometres beyond it.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::{CommuteRates, ReferenceData};
use crate::models::{AuditStep, AuditWarning, Settings, TravelCosts};

/// Rule reference for the distance allowance.
pub const TRAVEL_COSTS_LEGAL_REF: &str = "§ 9 Abs. 1 Satz 3 Nr. 4 EStG";

/// Warning code for commute days outside every configured rate period.
pub const COMMUTE_RATES_NOT_FOUND: &str = "COMMUTE_RATES_NOT_FOUND";

/// The deduction earned by one commute day, split by tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommuteDeduction {
    /// Amount for the kilometres up to the threshold.
    pub first_tier: Decimal,
    /// Amount for the kilometres beyond the threshold.
    pub above_tier: Decimal,
}

impl CommuteDeduction {
    /// Both tiers together.
    pub fn total(&self) -> Decimal {
        self.first_tier + self.above_tier
    }
}

/// The result of calculating travel costs, including the audit step.
#[derive(Debug, Clone)]
pub struct TravelCostResult {
    /// The aggregated travel costs.
    pub travel_costs: TravelCosts,
    /// The deduction of each commute day.
    pub per_day: BTreeMap<NaiveDate, Decimal>,
    /// Set when some commute days had no rate table.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// The tiered deduction of one commute.
///
/// # Example
///
/// ```
/// use crew_tax_engine::calculation::commute_deduction;
/// use crew_tax_engine::config::CommuteRates;
/// use rust_decimal::Decimal;
///
/// let rates = CommuteRates {
///     rate_first_20km: Decimal::new(30, 2),
///     rate_above_20km: Decimal::new(38, 2),
///     tier_threshold_km: Decimal::new(20, 0),
/// };
/// let deduction = commute_deduction(Decimal::new(25, 0), &rates);
/// assert_eq!(deduction.first_tier, Decimal::new(600, 2));
/// assert_eq!(deduction.above_tier, Decimal::new(190, 2));
/// assert_eq!(deduction.total(), Decimal::new(790, 2));
/// ```
pub fn commute_deduction(distance_km: Decimal, rates: &CommuteRates) -> CommuteDeduction {
    let distance = distance_km.max(Decimal::ZERO);
    let first_km = distance.min(rates.tier_threshold_km);
    let above_km = (distance - rates.tier_threshold_km).max(Decimal::ZERO);
    CommuteDeduction {
        first_tier: first_km * rates.rate_first_20km,
        above_tier: above_km * rates.rate_above_20km,
    }
}

/// Calculates the commute deduction over a set of commute days.
///
/// # Arguments
///
/// * `commute_days` - Distinct dates with a commute to the home base
/// * `settings` - Supplies the one-way distance
/// * `reference` - Supplies the commute rates effective on each date
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// A `TravelCostResult`. Commute days outside every rate period earn nothing
/// and are listed in a warning. A zero or negative distance yields a zero
/// deduction without consulting the rate table.
pub fn calculate_travel_costs<R: ReferenceData + ?Sized>(
    commute_days: &BTreeSet<NaiveDate>,
    settings: &Settings,
    reference: &R,
    step_number: u32,
) -> TravelCostResult {
    let distance = settings.effective_distance_km();
    let trips = u32::try_from(commute_days.len()).unwrap_or(u32::MAX);

    let mut first_total = Decimal::ZERO;
    let mut above_total = Decimal::ZERO;
    let mut per_day = BTreeMap::new();
    let mut unrated: Vec<NaiveDate> = Vec::new();

    if distance > Decimal::ZERO {
        for &date in commute_days {
            let Some(rates) = reference.commute_rates(date) else {
                unrated.push(date);
                continue;
            };
            let deduction = commute_deduction(distance, rates);
            first_total += deduction.first_tier;
            above_total += deduction.above_tier;
            per_day.insert(date, deduction.total());
        }
    }

    let warning = unrated.first().map(|first| {
        tracing::warn!(
            days = unrated.len(),
            first = %first,
            "Commute days outside every rate period"
        );
        AuditWarning::new(
            COMMUTE_RATES_NOT_FOUND,
            format!(
                "{} commute day(s) from {} have no effective commute rates; no deduction granted",
                unrated.len(),
                first
            ),
            "medium",
        )
    });

    let total = first_total + above_total;
    let total_km = distance * Decimal::from(trips);

    let audit_step = AuditStep {
        step_number,
        rule_id: "travel_costs".to_string(),
        rule_name: "Commute Distance Deduction".to_string(),
        legal_ref: TRAVEL_COSTS_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "trips": trips,
            "distance_km": distance.normalize().to_string(),
        }),
        output: serde_json::json!({
            "unrated_days": unrated.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
            "total_km": total_km.normalize().to_string(),
            "rate_first_20km": first_total.normalize().to_string(),
            "rate_above_20km": above_total.normalize().to_string(),
            "total": total.normalize().to_string(),
        }),
        reasoning: format!(
            "{} trip(s) × {} km: €{} for the first tier + €{} above = €{}",
            trips,
            distance.normalize(),
            first_total.normalize(),
            above_total.normalize(),
            total.normalize()
        ),
    };

    TravelCostResult {
        travel_costs: TravelCosts {
            trips,
            total_km,
            rate_first_20km: first_total,
            rate_above_20km: above_total,
            total,
        },
        per_day,
        warning,
        audit_step,
    }
}
