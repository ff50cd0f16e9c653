use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

// ============ Domain Models ============

/// A set of weather readings used as scoring input.
///
/// Every field is optional. An absent reading excludes that factor from the
/// score entirely, which is not the same as a reading of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherObservation {
    /// Air temperature in °C.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Relative humidity in percent (0-100).
    #[serde(default)]
    pub humidity: Option<f64>,
    /// Precipitation in mm.
    #[serde(default)]
    pub precipitation: Option<f64>,
    /// Wind speed in km/h.
    #[serde(default)]
    pub wind_speed: Option<f64>,
}

impl WeatherObservation {
    /// Returns the reading only when it is present and finite.
    fn finite(value: Option<f64>) -> Option<f64> {
        value.filter(|v| v.is_finite())
    }

    pub fn temperature(&self) -> Option<f64> {
        Self::finite(self.temperature)
    }

    pub fn humidity(&self) -> Option<f64> {
        Self::finite(self.humidity)
    }

    pub fn precipitation(&self) -> Option<f64> {
        Self::finite(self.precipitation)
    }

    pub fn wind_speed(&self) -> Option<f64> {
        Self::finite(self.wind_speed)
    }

    /// Feature vector in model order: temperature, humidity, precipitation, wind speed.
    ///
    /// Returns `None` unless all four readings are usable.
    pub fn feature_vector(&self) -> Option<[f64; 4]> {
        Some([
            self.temperature()?,
            self.humidity()?,
            self.precipitation()?,
            self.wind_speed()?,
        ])
    }
}

/// Flood risk level derived from a score in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "MINIMAL",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Extreme => "EXTREME",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk category over a score normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
    Severe,
    Extreme,
}

/// Bucket attached to a financial estimate, derived from severity and location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FinancialRiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

/// Result of scoring one observation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
}

/// Location attributes relevant to loss estimation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationAttributes {
    /// One of `flood_plain`, `coastal`, `urban`, `rural`. Anything else counts as rural.
    #[serde(default, rename = "type")]
    pub location_type: Option<String>,
    /// Whether the property hosts a business.
    #[serde(default)]
    pub is_business: bool,
}

/// Derived loss estimate for a property.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FinancialEstimate {
    pub severity_factor: f64,
    pub location_multiplier: f64,
    pub estimated_damage: f64,
    pub business_interruption: f64,
    pub insurance_payout: f64,
    pub risk_level: FinancialRiskLevel,
}

/// Linear exposure estimate scaled by a normalized risk score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ExposureEstimate {
    pub estimated_property_damage: f64,
    pub estimated_business_interruption: f64,
    pub estimated_insurance_payout: f64,
}

// ============ API Request/Response Models ============

/// Body of `POST /predict`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PredictRequest {
    #[serde(default, alias = "weather_data")]
    pub weather: WeatherObservation,
}

/// Response of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictResponse {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
}

impl From<RiskAssessment> for PredictResponse {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            risk_score: assessment.risk_score,
            risk_level: assessment.risk_level,
            factors: assessment.factors,
        }
    }
}

/// Body of `POST /financial-risk`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FinancialRiskRequest {
    #[serde(default)]
    pub location: Option<LocationAttributes>,
    pub property_value: f64,
    #[serde(default)]
    pub flood_severity: Option<String>,
}

/// Response of `POST /financial-risk`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FinancialRiskResponse {
    #[serde(flatten)]
    pub estimate: FinancialEstimate,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /api/v1/predictions`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PredictionReportRequest {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, alias = "weather_data")]
    pub weather: WeatherObservation,
}

/// Response of `POST /api/v1/predictions`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PredictionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_category: RiskCategory,
    pub factors: Vec<String>,
    #[serde(flatten)]
    pub exposure: ExposureEstimate,
    pub prediction_time: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub model_version: String,
}

/// Query parameters of `GET /api/v1/risk`.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoordinatesQuery {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Flood risk computed from live weather at a coordinate pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FloodRiskReport {
    pub latitude: f64,
    pub longitude: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
    pub weather: WeatherObservation,
    pub timestamp: DateTime<Utc>,
}

/// Response of `GET /model/status`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelStatus {
    /// `heuristic` or `trained_model`.
    pub strategy: String,
    pub trained: bool,
    pub version: String,
    pub trees: usize,
    pub features: Vec<String>,
}
