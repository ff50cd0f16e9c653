//! Heuristic flood risk scoring.
//!
//! Pure functions mapping a [`WeatherObservation`] to a score in [0, 100], a
//! [`RiskLevel`] and an ordered list of risk factors. The heuristic is the
//! fallback used whenever no trained model is loaded.

use crate::models::{RiskCategory, RiskLevel, WeatherObservation};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

pub const HEAVY_PRECIPITATION: &str = "Heavy precipitation";
pub const HIGH_HUMIDITY: &str = "High humidity";
pub const STRONG_WINDS: &str = "Strong winds";
pub const NEAR_FREEZING: &str = "Near-freezing temperatures";
pub const EXTREME_CONDITIONS: &str = "Extreme flood risk conditions";
pub const HIGH_CONDITIONS: &str = "High flood risk conditions";

/// Precipitation points: 4 per mm, capped at 40.
pub fn precipitation_contribution(precipitation: f64) -> f64 {
    (precipitation * 4.0).min(40.0)
}

/// Humidity points: linear, 100% maps to 20.
pub fn humidity_contribution(humidity: f64) -> f64 {
    (humidity / 100.0) * 20.0
}

/// Wind points: 1 per 2 km/h, capped at 20.
pub fn wind_contribution(wind_speed: f64) -> f64 {
    (wind_speed / 2.0).min(20.0)
}

/// Proximity-to-freezing points: 20 at 0°C, falling to 0 at ±10°C.
pub fn temperature_contribution(temperature: f64) -> f64 {
    (20.0 - 2.0 * temperature.abs()).max(0.0)
}

/// Clamps a raw score into [0, 100]. NaN maps to 0.
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return MIN_SCORE;
    }
    raw.clamp(MIN_SCORE, MAX_SCORE)
}

/// Computes the heuristic risk score for an observation.
///
/// Absent readings contribute nothing. The result always lies in [0, 100].
pub fn compute_score(observation: &WeatherObservation) -> f64 {
    let mut score = 0.0;

    if let Some(precipitation) = observation.precipitation() {
        score += precipitation_contribution(precipitation);
    }
    if let Some(humidity) = observation.humidity() {
        score += humidity_contribution(humidity);
    }
    if let Some(wind_speed) = observation.wind_speed() {
        score += wind_contribution(wind_speed);
    }
    if let Some(temperature) = observation.temperature() {
        score += temperature_contribution(temperature);
    }

    clamp_score(score)
}

/// Maps a score to its risk level. Boundary values belong to the higher level.
pub fn classify(score: f64) -> RiskLevel {
    if score >= 80.0 {
        RiskLevel::Extreme
    } else if score >= 60.0 {
        RiskLevel::High
    } else if score >= 40.0 {
        RiskLevel::Medium
    } else if score >= 20.0 {
        RiskLevel::Low
    } else {
        RiskLevel::Minimal
    }
}

/// Maps a score normalized to [0, 1] to its risk category.
pub fn classify_normalized(normalized: f64) -> RiskCategory {
    if normalized < 0.2 {
        RiskCategory::Low
    } else if normalized < 0.4 {
        RiskCategory::Moderate
    } else if normalized < 0.6 {
        RiskCategory::High
    } else if normalized < 0.8 {
        RiskCategory::Severe
    } else {
        RiskCategory::Extreme
    }
}

/// Lists the risk factors present in an observation.
///
/// The order is fixed: precipitation, humidity, wind, temperature, then at most
/// one score-derived factor.
pub fn explain(observation: &WeatherObservation, score: f64) -> Vec<String> {
    let mut factors = Vec::new();

    if observation.precipitation().is_some_and(|p| p > 10.0) {
        factors.push(HEAVY_PRECIPITATION.to_string());
    }
    if observation.humidity().is_some_and(|h| h > 80.0) {
        factors.push(HIGH_HUMIDITY.to_string());
    }
    if observation.wind_speed().is_some_and(|w| w > 20.0) {
        factors.push(STRONG_WINDS.to_string());
    }
    if observation.temperature().is_some_and(|t| t.abs() < 5.0) {
        factors.push(NEAR_FREEZING.to_string());
    }

    if score >= 80.0 {
        factors.push(EXTREME_CONDITIONS.to_string());
    } else if score >= 60.0 {
        factors.push(HIGH_CONDITIONS.to_string());
    }

    factors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(
        temperature: Option<f64>,
        humidity: Option<f64>,
        precipitation: Option<f64>,
        wind_speed: Option<f64>,
    ) -> WeatherObservation {
        WeatherObservation {
            temperature,
            humidity,
            precipitation,
            wind_speed,
        }
    }

    #[test]
    fn test_empty_observation_scores_zero() {
        let empty = WeatherObservation::default();
        let score = compute_score(&empty);
        assert_eq!(score, 0.0);
        assert_eq!(classify(score), RiskLevel::Minimal);
        assert!(explain(&empty, score).is_empty());
    }

    #[test]
    fn test_precipitation_saturates_at_40() {
        assert_eq!(precipitation_contribution(2.5), 10.0);
        assert_eq!(precipitation_contribution(10.0), 40.0);
        assert_eq!(precipitation_contribution(250.0), 40.0);
    }

    #[test]
    fn test_humidity_is_linear() {
        assert_eq!(humidity_contribution(0.0), 0.0);
        assert_eq!(humidity_contribution(50.0), 10.0);
        assert_eq!(humidity_contribution(100.0), 20.0);
    }

    #[test]
    fn test_wind_saturates_at_20() {
        assert_eq!(wind_contribution(10.0), 5.0);
        assert_eq!(wind_contribution(40.0), 20.0);
        assert_eq!(wind_contribution(120.0), 20.0);
    }

    #[test]
    fn test_temperature_peaks_at_freezing() {
        assert_eq!(temperature_contribution(0.0), 20.0);
        assert_eq!(temperature_contribution(3.0), temperature_contribution(-3.0));
        assert_eq!(temperature_contribution(3.0), 14.0);
        assert_eq!(temperature_contribution(10.0), 0.0);
        assert_eq!(temperature_contribution(-25.0), 0.0);
    }

    #[test]
    fn test_zero_reading_differs_from_absent() {
        // 0°C is the peak of the temperature signal, absence contributes nothing.
        let zero = obs(Some(0.0), None, None, None);
        let absent = obs(None, None, None, None);
        assert_eq!(compute_score(&zero), 20.0);
        assert_eq!(compute_score(&absent), 0.0);
    }

    #[test]
    fn test_full_observation_score() {
        let o = obs(Some(2.0), Some(90.0), Some(15.0), Some(25.0));
        // 40 + 18 + 12.5 + 16
        assert!((compute_score(&o) - 86.5).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_clamped() {
        let o = obs(Some(-40.0), Some(-500.0), None, None);
        assert_eq!(compute_score(&o), 0.0);

        let o = obs(Some(0.0), Some(10_000.0), Some(100.0), Some(100.0));
        assert_eq!(compute_score(&o), 100.0);
    }

    #[test]
    fn test_non_finite_readings_are_ignored() {
        let o = obs(Some(f64::NAN), Some(f64::INFINITY), Some(5.0), None);
        assert_eq!(compute_score(&o), 20.0);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(100.0), RiskLevel::Extreme);
        assert_eq!(classify(80.0), RiskLevel::Extreme);
        assert_eq!(classify(79.999), RiskLevel::High);
        assert_eq!(classify(60.0), RiskLevel::High);
        assert_eq!(classify(59.999), RiskLevel::Medium);
        assert_eq!(classify(40.0), RiskLevel::Medium);
        assert_eq!(classify(20.0), RiskLevel::Low);
        assert_eq!(classify(19.999), RiskLevel::Minimal);
        assert_eq!(classify(0.0), RiskLevel::Minimal);
    }

    #[test]
    fn test_classify_normalized_boundaries() {
        assert_eq!(classify_normalized(0.0), RiskCategory::Low);
        assert_eq!(classify_normalized(0.199), RiskCategory::Low);
        assert_eq!(classify_normalized(0.2), RiskCategory::Moderate);
        assert_eq!(classify_normalized(0.4), RiskCategory::High);
        assert_eq!(classify_normalized(0.6), RiskCategory::Severe);
        assert_eq!(classify_normalized(0.8), RiskCategory::Extreme);
        assert_eq!(classify_normalized(1.0), RiskCategory::Extreme);
    }

    #[test]
    fn test_explain_fixed_order() {
        let o = obs(Some(2.0), Some(90.0), Some(15.0), Some(25.0));
        assert_eq!(
            explain(&o, 85.0),
            vec![
                "Heavy precipitation",
                "High humidity",
                "Strong winds",
                "Near-freezing temperatures",
                "Extreme flood risk conditions",
            ]
        );
    }

    #[test]
    fn test_explain_thresholds_are_strict() {
        let o = obs(Some(5.0), Some(80.0), Some(10.0), Some(20.0));
        assert!(explain(&o, 0.0).is_empty());

        let o = obs(Some(-4.9), None, None, None);
        assert_eq!(explain(&o, 0.0), vec![NEAR_FREEZING]);
    }

    #[test]
    fn test_explain_score_factors_are_exclusive() {
        let empty = WeatherObservation::default();
        assert_eq!(explain(&empty, 80.0), vec![EXTREME_CONDITIONS]);
        assert_eq!(explain(&empty, 79.9), vec![HIGH_CONDITIONS]);
        assert_eq!(explain(&empty, 60.0), vec![HIGH_CONDITIONS]);
        assert!(explain(&empty, 59.9).is_empty());
    }
}
