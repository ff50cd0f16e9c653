use crate::config::Config;
use crate::engine::{self, RiskScorer};
use crate::errors::{AppError, ResultExt};
use crate::extract::JsonBody;
use crate::financial;
use crate::models::*;
use crate::scoring;
use crate::weather_client::WeatherClient;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;

/// How long a prediction report stays valid.
const PREDICTION_VALIDITY_HOURS: i64 = 24;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Scoring strategy selected at startup.
    pub scorer: Arc<dyn RiskScorer>,
    /// Client for current weather conditions (optional).
    pub weather_client: Option<WeatherClient>,
    /// Live weather readings keyed by rounded coordinates.
    pub weather_cache: Cache<String, CachedWeather>,
}

/// Weather readings for a location and when they were fetched.
#[derive(Debug, Clone, Copy)]
pub struct CachedWeather {
    pub weather: WeatherObservation,
    pub fetched_at: DateTime<Utc>,
}

impl AppState {
    /// Builds state with a report cache sized from the configuration.
    pub fn new(
        config: Config,
        scorer: Arc<dyn RiskScorer>,
        weather_client: Option<WeatherClient>,
    ) -> Self {
        let weather_cache = Cache::builder()
            .time_to_live(std::time::Duration::from_secs(config.weather_cache_ttl_secs))
            .max_capacity(10_000)
            .build();

        Self {
            config,
            scorer,
            weather_client,
            weather_cache,
        }
    }
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// POST /predict
///
/// Scores a weather observation with the active strategy.
#[utoipa::path(
    post,
    path = "/predict",
    tag = "scoring",
    request_body = PredictRequest,
    responses((status = 200, description = "Flood risk assessment", body = PredictResponse))
)]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<PredictRequest>,
) -> Json<PredictResponse> {
    let assessment = engine::assess(state.scorer.as_ref(), &request.weather);

    tracing::info!(
        "Predicted flood risk {:.2} ({}) with {} factor(s)",
        assessment.risk_score,
        assessment.risk_level,
        assessment.factors.len()
    );

    Json(assessment.into())
}

/// POST /api/v1/predictions
///
/// Scores an observation and attaches the normalized category and exposure estimates.
#[utoipa::path(
    post,
    path = "/api/v1/predictions",
    tag = "scoring",
    request_body = PredictionReportRequest,
    responses((status = 200, description = "Prediction report", body = PredictionReport))
)]
pub async fn prediction_report(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<PredictionReportRequest>,
) -> Json<PredictionReport> {
    let assessment = engine::assess(state.scorer.as_ref(), &request.weather);
    let normalized = assessment.risk_score / scoring::MAX_SCORE;
    let prediction_time = Utc::now();

    tracing::info!(
        "Prediction report at ({:?}, {:?}): score {:.2}",
        request.latitude,
        request.longitude,
        assessment.risk_score
    );

    Json(PredictionReport {
        latitude: request.latitude,
        longitude: request.longitude,
        risk_score: assessment.risk_score,
        risk_level: assessment.risk_level,
        risk_category: scoring::classify_normalized(normalized),
        factors: assessment.factors,
        exposure: financial::exposure(normalized),
        prediction_time,
        valid_until: prediction_time + Duration::hours(PREDICTION_VALIDITY_HOURS),
        model_version: state.scorer.version().to_string(),
    })
}

/// POST /financial-risk
///
/// Estimates flood losses for a property.
#[utoipa::path(
    post,
    path = "/financial-risk",
    tag = "financial",
    request_body = FinancialRiskRequest,
    responses((status = 200, description = "Financial loss estimate", body = FinancialRiskResponse))
)]
pub async fn financial_risk(
    JsonBody(request): JsonBody<FinancialRiskRequest>,
) -> Json<FinancialRiskResponse> {
    let location = request.location.unwrap_or_default();
    let estimate = financial::estimate(
        request.flood_severity.as_deref(),
        request.property_value,
        &location,
    );

    tracing::info!(
        "Financial risk for severity {:?}, location {:?}: damage {:.2}, level {:?}",
        request.flood_severity,
        location.location_type,
        estimate.estimated_damage,
        estimate.risk_level
    );

    Json(FinancialRiskResponse {
        estimate,
        timestamp: Utc::now(),
    })
}

/// GET /api/v1/risk
///
/// Scores live weather at a coordinate pair. Readings are cached per rounded location.
#[utoipa::path(
    get,
    path = "/api/v1/risk",
    tag = "scoring",
    params(CoordinatesQuery),
    responses(
        (status = 200, description = "Live flood risk report", body = FloodRiskReport),
        (status = 400, description = "Coordinates out of range"),
        (status = 502, description = "Weather API error"),
        (status = 503, description = "Weather lookups not configured or circuit open")
    )
)]
pub async fn location_risk(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoordinatesQuery>,
) -> Result<Json<FloodRiskReport>, AppError> {
    validate_coordinates(params.latitude, params.longitude)?;

    let client = state.weather_client.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Weather lookups are not configured".to_string())
    })?;

    let cache_key = coordinates_key(params.latitude, params.longitude);
    let cached = match state.weather_cache.get(&cache_key).await {
        Some(cached) => {
            tracing::debug!("Weather cache HIT for {}", cache_key);
            cached
        }
        None => {
            tracing::debug!("Weather cache MISS for {}", cache_key);
            let weather = client
                .current_conditions(params.latitude, params.longitude)
                .await
                .with_context(|| format!("Fetching weather for {}", cache_key))?;
            let cached = CachedWeather {
                weather,
                fetched_at: Utc::now(),
            };
            state.weather_cache.insert(cache_key, cached).await;
            cached
        }
    };

    // Reports always carry the caller's coordinates, not the cache key's.
    let assessment = engine::assess(state.scorer.as_ref(), &cached.weather);
    let report = FloodRiskReport {
        latitude: params.latitude,
        longitude: params.longitude,
        risk_score: assessment.risk_score,
        risk_level: assessment.risk_level,
        factors: assessment.factors,
        weather: cached.weather,
        timestamp: cached.fetched_at,
    };

    Ok(Json(report))
}

/// GET /model/status
#[utoipa::path(
    get,
    path = "/model/status",
    tag = "system",
    responses((status = 200, description = "Active scoring strategy", body = ModelStatus))
)]
pub async fn model_status(State(state): State<Arc<AppState>>) -> Json<ModelStatus> {
    Json(state.scorer.status())
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::BadRequest(format!(
            "latitude must be between -90 and 90, got {}",
            latitude
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::BadRequest(format!(
            "longitude must be between -180 and 180, got {}",
            longitude
        )));
    }
    Ok(())
}

/// Cache key for a coordinate pair, rounded to 4 decimals (about 11 m).
pub fn coordinates_key(latitude: f64, longitude: f64) -> String {
    format!("{:.4},{:.4}", latitude, longitude)
}
