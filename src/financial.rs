//! Financial loss estimation.
//!
//! Two estimates live here. [`estimate`] derives damage, business interruption
//! and insurance payout from a named flood severity and the location type.
//! [`exposure`] scales fixed maximum exposures by a normalized risk score and
//! backs the prediction report.

use crate::models::{ExposureEstimate, FinancialEstimate, FinancialRiskLevel, LocationAttributes};

/// Severity factor used when the severity is absent or unrecognized.
pub const DEFAULT_SEVERITY_FACTOR: f64 = 0.1;
/// Location multiplier used when the location type is absent or unrecognized.
pub const DEFAULT_LOCATION_MULTIPLIER: f64 = 1.0;

const BUSINESS_INTERRUPTION_RATE: f64 = 0.3;
const COVERAGE_FACTOR: f64 = 0.8;
const DEDUCTIBLE_RATE: f64 = 0.1;

const MAX_PROPERTY_DAMAGE: f64 = 100_000.0;
const MAX_BUSINESS_INTERRUPTION: f64 = 50_000.0;
const MAX_INSURANCE_PAYOUT: f64 = 80_000.0;

/// Looks up the severity factor (case-insensitive).
pub fn severity_factor(flood_severity: Option<&str>) -> f64 {
    let Some(severity) = flood_severity else {
        return DEFAULT_SEVERITY_FACTOR;
    };

    match severity.trim().to_ascii_lowercase().as_str() {
        "low" => 0.1,
        "medium" => 0.3,
        "high" => 0.6,
        "extreme" => 0.9,
        other => {
            tracing::debug!("Unrecognized flood severity '{}', using default factor", other);
            DEFAULT_SEVERITY_FACTOR
        }
    }
}

/// Looks up the location multiplier (case-insensitive).
pub fn location_multiplier(location_type: Option<&str>) -> f64 {
    let Some(location_type) = location_type else {
        return DEFAULT_LOCATION_MULTIPLIER;
    };

    match location_type.trim().to_ascii_lowercase().as_str() {
        "flood_plain" => 1.5,
        "coastal" => 1.3,
        "urban" => 1.2,
        "rural" => 1.0,
        other => {
            tracing::debug!("Unrecognized location type '{}', treating as rural", other);
            DEFAULT_LOCATION_MULTIPLIER
        }
    }
}

/// Buckets the combined severity/location factor.
pub fn financial_risk_level(combined_factor: f64) -> FinancialRiskLevel {
    if combined_factor >= 0.7 {
        FinancialRiskLevel::Extreme
    } else if combined_factor >= 0.5 {
        FinancialRiskLevel::High
    } else if combined_factor >= 0.3 {
        FinancialRiskLevel::Medium
    } else {
        FinancialRiskLevel::Low
    }
}

/// Estimates flood losses for a property.
///
/// Non-positive property values are not rejected and flow through the arithmetic.
pub fn estimate(
    flood_severity: Option<&str>,
    property_value: f64,
    location: &LocationAttributes,
) -> FinancialEstimate {
    let severity_factor = severity_factor(flood_severity);
    let location_multiplier = location_multiplier(location.location_type.as_deref());

    let base_damage = property_value * severity_factor * location_multiplier;

    let business_interruption = if location.is_business {
        base_damage * BUSINESS_INTERRUPTION_RATE
    } else {
        0.0
    };

    let deductible = base_damage * DEDUCTIBLE_RATE;
    let insurance_payout = (base_damage * COVERAGE_FACTOR - deductible).max(0.0);

    FinancialEstimate {
        severity_factor,
        location_multiplier,
        estimated_damage: base_damage,
        business_interruption,
        insurance_payout,
        risk_level: financial_risk_level(severity_factor * location_multiplier),
    }
}

/// Scales the maximum exposures by a score normalized to [0, 1].
pub fn exposure(normalized_score: f64) -> ExposureEstimate {
    let r = normalized_score.clamp(0.0, 1.0);
    ExposureEstimate {
        estimated_property_damage: r * MAX_PROPERTY_DAMAGE,
        estimated_business_interruption: r * MAX_BUSINESS_INTERRUPTION,
        estimated_insurance_payout: r * MAX_INSURANCE_PAYOUT,
    }
}
