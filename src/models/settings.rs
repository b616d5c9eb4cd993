//! User settings for a deduction calculation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DutyType;

/// Settings that parameterise every calculation.
///
/// All money values are in euros; the distance is the one-way distance from
/// home to the home-base airport in kilometres.
///
/// # Example
///
/// ```
/// use crew_tax_engine::models::{DutyType, Settings};
/// use rust_decimal::Decimal;
///
/// let settings = Settings::default();
/// assert_eq!(settings.cleaning_cost_per_day, Decimal::new(160, 2));
/// assert_eq!(settings.tip_rate_per_night, Decimal::new(360, 2));
/// assert!(settings.counts_as_workday(DutyType::Medical));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// One-way commute distance in kilometres.
    pub distance_to_work_km: Decimal,
    /// Flat cleaning cost per workday.
    pub cleaning_cost_per_day: Decimal,
    /// Tip allowance per hotel night.
    pub tip_rate_per_night: Decimal,
    /// Tax-free meal reimbursement already paid by the employer.
    pub employer_reimbursement: Decimal,
    /// Non-flight duty types that count as workdays.
    pub workday_duty_types: Vec<DutyType>,
    /// Whether workday ground duties also count as commute trips.
    pub count_ground_duty_as_commute: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            distance_to_work_km: Decimal::ZERO,
            cleaning_cost_per_day: Decimal::new(160, 2),
            tip_rate_per_night: Decimal::new(360, 2),
            employer_reimbursement: Decimal::ZERO,
            workday_duty_types: vec![
                DutyType::GroundDuty,
                DutyType::Medical,
                DutyType::Standby,
                DutyType::EmergencyMedical,
                DutyType::Simulator,
                DutyType::Training,
                DutyType::Office,
            ],
            count_ground_duty_as_commute: true,
        }
    }
}

/// A partial set of settings sent with a request.
///
/// Fields left out keep the value of the settings they are applied to.
///
/// # Example
///
/// ```
/// use crew_tax_engine::models::{Settings, SettingsOverrides};
/// use rust_decimal::Decimal;
///
/// let defaults = Settings {
///     tip_rate_per_night: Decimal::new(400, 2),
///     ..Settings::default()
/// };
/// let overrides: SettingsOverrides =
///     serde_json::from_str(r#"{ "distanceToWorkKm": "42" }"#).unwrap();
/// let settings = overrides.apply_to(&defaults);
/// assert_eq!(settings.distance_to_work_km, Decimal::new(42, 0));
/// assert_eq!(settings.tip_rate_per_night, Decimal::new(400, 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOverrides {
    /// One-way commute distance in kilometres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_work_km: Option<Decimal>,
    /// Flat cleaning cost per workday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaning_cost_per_day: Option<Decimal>,
    /// Tip allowance per hotel night.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_rate_per_night: Option<Decimal>,
    /// Tax-free meal reimbursement already paid by the employer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer_reimbursement: Option<Decimal>,
    /// Non-flight duty types that count as workdays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workday_duty_types: Option<Vec<DutyType>>,
    /// Whether workday ground duties also count as commute trips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_ground_duty_as_commute: Option<bool>,
}

impl SettingsOverrides {
    /// Returns `base` with every field present here replaced.
    pub fn apply_to(&self, base: &Settings) -> Settings {
        Settings {
            distance_to_work_km: self.distance_to_work_km.unwrap_or(base.distance_to_work_km),
            cleaning_cost_per_day: self.cleaning_cost_per_day.unwrap_or(base.cleaning_cost_per_day),
            tip_rate_per_night: self.tip_rate_per_night.unwrap_or(base.tip_rate_per_night),
            employer_reimbursement: self
                .employer_reimbursement
                .unwrap_or(base.employer_reimbursement),
            workday_duty_types: self
                .workday_duty_types
                .clone()
                .unwrap_or_else(|| base.workday_duty_types.clone()),
            count_ground_duty_as_commute: self
                .count_ground_duty_as_commute
                .unwrap_or(base.count_ground_duty_as_commute),
        }
    }
}

impl Settings {
    /// Returns true if a non-flight day of this type counts as a workday.
    pub fn counts_as_workday(&self, duty_type: DutyType) -> bool {
        self.workday_duty_types.contains(&duty_type)
    }

    /// The commute distance, with negative values treated as zero.
    pub fn effective_distance_km(&self) -> Decimal {
        self.distance_to_work_km.max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings: Settings =
            serde_json::from_value(serde_json::json!({ "distanceToWorkKm": "42" })).unwrap();
        assert_eq!(settings.distance_to_work_km, Decimal::new(42, 0));
        assert_eq!(settings.cleaning_cost_per_day, Decimal::new(160, 2));
        assert!(settings.count_ground_duty_as_commute);
    }

    #[test]
    fn test_overrides_keep_base_values_for_absent_fields() {
        let base = Settings {
            cleaning_cost_per_day: Decimal::new(200, 2),
            workday_duty_types: vec![DutyType::Medical],
            count_ground_duty_as_commute: false,
            ..Settings::default()
        };
        let overrides: SettingsOverrides = serde_json::from_value(serde_json::json!({
            "distanceToWorkKm": "42",
            "employerReimbursement": "10"
        }))
        .unwrap();

        let settings = overrides.apply_to(&base);
        assert_eq!(settings.distance_to_work_km, Decimal::new(42, 0));
        assert_eq!(settings.employer_reimbursement, Decimal::new(10, 0));
        assert_eq!(settings.cleaning_cost_per_day, Decimal::new(200, 2));
        assert_eq!(settings.workday_duty_types, vec![DutyType::Medical]);
        assert!(!settings.count_ground_duty_as_commute);
    }

    #[test]
    fn test_empty_overrides_reproduce_base() {
        let base = Settings {
            tip_rate_per_night: Decimal::new(500, 2),
            ..Settings::default()
        };
        assert_eq!(SettingsOverrides::default().apply_to(&base), base);
    }

    #[test]
    fn test_negative_distance_is_clamped() {
        let settings = Settings {
            distance_to_work_km: Decimal::new(-5, 0),
            ..Settings::default()
        };
        assert_eq!(settings.effective_distance_km(), Decimal::ZERO);
    }

    #[test]
    fn test_other_duty_is_not_a_default_workday() {
        let settings = Settings::default();
        assert!(!settings.counts_as_workday(DutyType::Other));
        assert!(settings.counts_as_workday(DutyType::Simulator));
    }
}
