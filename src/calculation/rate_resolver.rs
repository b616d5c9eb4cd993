//! Per-diem rate resolution.
//!
//! Maps a measured date onto the statutory per-diem table: the partial rate
//! for absences over eight hours and for departure days with an overnight
//! stay, the full rate for every intermediate day of a trip abroad.

use rust_decimal::Decimal;

use crate::config::{ReferenceData, UNKNOWN_COUNTRY};
use crate::models::{
    AuditStep, AuditWarning, DailyAllowanceInfo, DutyType, RateType, Settings, TripDayRole,
};

use super::absence::DayAbsence;
use super::duty_time::TimedGroundDay;

/// Absence in minutes that must be exceeded for the partial rate.
pub const PARTIAL_RATE_THRESHOLD_MINUTES: u32 = 480;

/// Rule reference for the per-diem tiers.
pub const MEAL_ALLOWANCE_LEGAL_REF: &str = "§ 9 Abs. 4a EStG";

/// The result of resolving one candidate, including the audit step.
#[derive(Debug, Clone)]
pub struct RateResolutionResult {
    /// The allowance, if the candidate qualifies.
    pub allowance: Option<DailyAllowanceInfo>,
    /// A warning when the candidate qualifies but no rate can be found.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this decision.
    pub audit_step: AuditStep,
}

/// Resolves the allowance of a flight-derived trip date.
///
/// # Arguments
///
/// * `day` - The measured trip date
/// * `reference` - Supplies the home country and the rate table
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// A `RateResolutionResult` whose allowance is:
/// - the full rate for any intermediate date abroad, whatever its minutes
/// - the partial rate for a departure date with an overnight stay abroad
/// - the partial rate for any other date with more than 480 minutes away
/// - `None` otherwise, or when the location has no rate (with a warning)
pub fn resolve_trip_day_rate<R: ReferenceData + ?Sized>(
    day: &DayAbsence,
    reference: &R,
    step_number: u32,
) -> RateResolutionResult {
    let input = serde_json::json!({
        "date": day.date.to_string(),
        "role": day.role.to_string(),
        "minutes": day.minutes,
        "overnight_stay": day.overnight_stay,
        "whole_day_away": day.whole_day_away,
        "location": day.location.as_ref().map(|l| l.airport.clone()),
    });

    let Some(location) = &day.location else {
        return decision(
            step_number,
            input,
            None,
            None,
            format!("{}: no flight activity, no allowance from flights", day.date),
        );
    };

    let home = reference.home_country();
    let domestic = location.country == home;
    let tier = if domestic {
        (day.minutes > PARTIAL_RATE_THRESHOLD_MINUTES).then_some(RateType::Partial)
    } else if day.role == TripDayRole::IntermediateDay {
        Some(RateType::Full)
    } else if day.overnight_stay || day.minutes > PARTIAL_RATE_THRESHOLD_MINUTES {
        Some(RateType::Partial)
    } else {
        None
    };

    let Some(rate_type) = tier else {
        return decision(
            step_number,
            input,
            None,
            None,
            format!(
                "{}: {} minutes away on a {} does not reach the {} minute threshold",
                day.date, day.minutes, day.role, PARTIAL_RATE_THRESHOLD_MINUTES
            ),
        );
    };

    lookup(
        step_number,
        input,
        day.date,
        &location.country,
        location.city.as_deref(),
        rate_type,
        reference,
        format!("{} {} in {}", day.date, day.role, location.airport),
    )
}

/// Resolves the allowance of a non-flight day.
///
/// Medical, standby and emergency-medical duties receive the domestic partial
/// rate whenever their duty type counts as a workday. Simulator days receive
/// the partial rate when the measured absence exceeds 480 minutes, in the
/// day's country when one is recorded. Other duty types receive nothing.
pub fn resolve_ground_day_rate<R: ReferenceData + ?Sized>(
    day: &TimedGroundDay<'_>,
    absence_minutes: u32,
    settings: &Settings,
    reference: &R,
    step_number: u32,
) -> RateResolutionResult {
    let record = day.day;
    let input = serde_json::json!({
        "date": record.date.to_string(),
        "duty_type": record.duty_type.to_string(),
        "minutes": absence_minutes,
        "country": record.country,
    });
    let home = reference.home_country().to_string();

    if record.duty_type.is_flat_rate_ground_duty() {
        if !settings.counts_as_workday(record.duty_type) {
            return decision(
                step_number,
                input,
                None,
                None,
                format!(
                    "{}: {} is not configured as a workday",
                    record.date, record.duty_type
                ),
            );
        }
        return lookup(
            step_number,
            input,
            record.date,
            &home,
            None,
            RateType::Partial,
            reference,
            format!("{}: flat-rate {} duty", record.date, record.duty_type),
        );
    }

    if record.duty_type == DutyType::Simulator {
        if absence_minutes > PARTIAL_RATE_THRESHOLD_MINUTES {
            let country = record.country.clone().unwrap_or(home);
            return lookup(
                step_number,
                input,
                record.date,
                &country,
                None,
                RateType::Partial,
                reference,
                format!(
                    "{}: simulator duty with {} minutes away",
                    record.date, absence_minutes
                ),
            );
        }
        return decision(
            step_number,
            input,
            None,
            None,
            format!(
                "{}: simulator duty with {} minutes away does not reach the {} minute threshold",
                record.date, absence_minutes, PARTIAL_RATE_THRESHOLD_MINUTES
            ),
        );
    }

    decision(
        step_number,
        input,
        None,
        None,
        format!(
            "{}: {} duty carries no meal allowance",
            record.date, record.duty_type
        ),
    )
}

#[allow(clippy::too_many_arguments)]
fn lookup<R: ReferenceData + ?Sized>(
    step_number: u32,
    input: serde_json::Value,
    date: chrono::NaiveDate,
    country: &str,
    city: Option<&str>,
    rate_type: RateType,
    reference: &R,
    context: String,
) -> RateResolutionResult {
    if country == UNKNOWN_COUNTRY {
        tracing::warn!(%date, "Unknown country, no meal allowance");
        let warning = AuditWarning::new(
            "UNKNOWN_COUNTRY",
            format!("{}: unknown country, no meal allowance granted", context),
            "medium",
        );
        return decision(
            step_number,
            input,
            None,
            Some(warning),
            format!("{}: country unknown", context),
        );
    }

    let Some(rate) = reference.meal_rate(country, city, date) else {
        tracing::warn!(%date, country, "No meal rate for country");
        let warning = AuditWarning::new(
            "RATE_NOT_FOUND",
            format!("{}: no meal rate for country {}", context, country),
            "medium",
        );
        return decision(
            step_number,
            input,
            None,
            Some(warning),
            format!("{}: country {} missing from the rate table", context, country),
        );
    };

    let amount: Decimal = match rate_type {
        RateType::Partial => rate.partial,
        RateType::Full => rate.full,
    };
    let place = match &rate.city {
        Some(city) => format!("{} ({})", rate.country, city),
        None => rate.country.clone(),
    };
    let reasoning = format!(
        "{}: {} rate for {} = €{}",
        context,
        match rate_type {
            RateType::Partial => "partial",
            RateType::Full => "full",
        },
        place,
        amount.normalize()
    );

    decision(
        step_number,
        input,
        Some(DailyAllowanceInfo {
            rate: amount,
            rate_type,
            country: rate.country,
        }),
        None,
        reasoning,
    )
}

fn decision(
    step_number: u32,
    input: serde_json::Value,
    allowance: Option<DailyAllowanceInfo>,
    warning: Option<AuditWarning>,
    reasoning: String,
) -> RateResolutionResult {
    let output = match &allowance {
        Some(info) => serde_json::json!({
            "rate": info.rate.normalize().to_string(),
            "rate_type": info.rate_type,
            "country": info.country,
        }),
        None => serde_json::json!({ "rate": null }),
    };

    RateResolutionResult {
        allowance,
        warning,
        audit_step: AuditStep {
            step_number,
            rule_id: "meal_rate".to_string(),
            rule_name: "Per-Diem Rate Resolution".to_string(),
            legal_ref: MEAL_ALLOWANCE_LEGAL_REF.to_string(),
            input,
            output,
            reasoning,
        },
    }
}
