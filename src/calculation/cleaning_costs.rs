//! Flat-rate uniform cleaning cost calculation.

use rust_decimal::Decimal;

use crate::models::{AuditStep, CleaningCosts};

/// Rule reference for work-clothing costs.
pub const CLEANING_COSTS_LEGAL_REF: &str = "§ 9 Abs. 1 Satz 3 Nr. 6 EStG";

/// The result of calculating cleaning costs, including the audit step.
#[derive(Debug, Clone)]
pub struct CleaningCostResult {
    /// The cleaning costs.
    pub cleaning_costs: CleaningCosts,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the flat cleaning cost deduction.
///
/// # Arguments
///
/// * `work_days` - The number of workdays
/// * `rate_per_day` - The cleaning cost per workday (e.g., €1.60)
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use crew_tax_engine::calculation::calculate_cleaning_costs;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let result = calculate_cleaning_costs(10, Decimal::from_str("1.60").unwrap(), 1);
/// assert_eq!(result.cleaning_costs.total, Decimal::from_str("16.00").unwrap());
/// ```
pub fn calculate_cleaning_costs(
    work_days: u32,
    rate_per_day: Decimal,
    step_number: u32,
) -> CleaningCostResult {
    let total = Decimal::from(work_days) * rate_per_day;

    let audit_step = AuditStep {
        step_number,
        rule_id: "cleaning_costs".to_string(),
        rule_name: "Uniform Cleaning Costs".to_string(),
        legal_ref: CLEANING_COSTS_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "work_days": work_days,
            "rate_per_day": rate_per_day.normalize().to_string()
        }),
        output: serde_json::json!({
            "total": total.normalize().to_string()
        }),
        reasoning: format!(
            "{} workdays × €{} = €{}",
            work_days,
            rate_per_day.normalize(),
            total.normalize()
        ),
    };

    CleaningCostResult {
        cleaning_costs: CleaningCosts {
            work_days,
            rate_per_day,
            total,
        },
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::dec;

    #[test]
    fn test_rate_times_workdays() {
        let result = calculate_cleaning_costs(187, dec("1.60"), 1);
        assert_eq!(result.cleaning_costs.total, dec("299.20"));
        assert_eq!(result.cleaning_costs.work_days, 187);
        assert_eq!(result.cleaning_costs.rate_per_day, dec("1.60"));
    }

    #[test]
    fn test_zero_workdays() {
        let result = calculate_cleaning_costs(0, dec("1.60"), 1);
        assert_eq!(result.cleaning_costs.total, Decimal::ZERO);
        assert_eq!(result.audit_step.output["total"], "0");
    }

    #[test]
    fn test_audit_step() {
        let result = calculate_cleaning_costs(3, dec("2"), 5);
        assert_eq!(result.audit_step.step_number, 5);
        assert_eq!(result.audit_step.rule_id, "cleaning_costs");
        assert_eq!(result.audit_step.reasoning, "3 workdays × €2 = €6");
    }
}
