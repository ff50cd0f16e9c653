use crate::circuit_breaker::{create_weather_circuit_breaker, WeatherCircuitBreaker};
use crate::errors::AppError;
use crate::models::WeatherObservation;
use failsafe::futures::CircuitBreaker;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const METERS_PER_SECOND_TO_KMH: f64 = 3.6;

/// Current-conditions payload of an OpenWeatherMap-compatible API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentWeatherResponse {
    #[serde(default)]
    pub main: Option<MainReadings>,
    #[serde(default)]
    pub wind: Option<WindReadings>,
    #[serde(default)]
    pub rain: Option<RainReadings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainReadings {
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindReadings {
    /// Metres per second with `units=metric`.
    #[serde(default)]
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RainReadings {
    /// Rain volume for the last hour, mm.
    #[serde(default, rename = "1h")]
    pub one_hour: Option<f64>,
}

impl From<CurrentWeatherResponse> for WeatherObservation {
    fn from(response: CurrentWeatherResponse) -> Self {
        let main = response.main.unwrap_or_default();
        WeatherObservation {
            temperature: main.temp,
            humidity: main.humidity,
            precipitation: response.rain.and_then(|r| r.one_hour),
            wind_speed: response
                .wind
                .and_then(|w| w.speed)
                .map(|speed| speed * METERS_PER_SECOND_TO_KMH),
        }
    }
}

/// Client for fetching current weather conditions.
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    breaker: WeatherCircuitBreaker,
}

impl WeatherClient {
    /// Creates a new `WeatherClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Full URL of the current-weather endpoint.
    /// * `api_key` - API key sent as the `appid` query parameter.
    pub fn new(base_url: String, api_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create weather client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            breaker: create_weather_circuit_breaker(),
        })
    }

    /// Fetches current conditions at a coordinate pair.
    ///
    /// Fails fast with `ServiceUnavailable` while the circuit breaker is open.
    pub async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherObservation, AppError> {
        match self.breaker.call(self.fetch(latitude, longitude)).await {
            Ok(observation) => Ok(observation),
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("Weather API circuit open, rejecting request");
                Err(AppError::ServiceUnavailable(
                    "Weather service temporarily unavailable".to_string(),
                ))
            }
        }
    }

    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherObservation, AppError> {
        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Fetching weather for ({}, {})", latitude, longitude);
        // Redact key from logs
        tracing::debug!(
            "Weather API URL: {}?lat={}&lon={}&appid=[REDACTED]&units=metric",
            self.base_url,
            latitude,
            longitude
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::ExternalApiError(format!("Weather API request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Weather API returned error {}: {}", status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "Weather API returned status {}: {}",
                status, error_text
            )));
        }

        let payload: CurrentWeatherResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse weather response: {}", e))
        })?;

        Ok(payload.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_maps_to_observation() {
        let payload: CurrentWeatherResponse = serde_json::from_str(
            r#"{
                "main": {"temp": 1.5, "humidity": 92, "pressure": 1002},
                "wind": {"speed": 10.0, "deg": 220},
                "rain": {"1h": 12.3}
            }"#,
        )
        .unwrap();

        let obs = WeatherObservation::from(payload);
        assert_eq!(obs.temperature, Some(1.5));
        assert_eq!(obs.humidity, Some(92.0));
        assert_eq!(obs.precipitation, Some(12.3));
        assert_eq!(obs.wind_speed, Some(36.0));
    }

    #[test]
    fn test_dry_payload_has_no_precipitation() {
        let payload: CurrentWeatherResponse =
            serde_json::from_str(r#"{"main": {"temp": 20.0, "humidity": 40}}"#).unwrap();

        let obs = WeatherObservation::from(payload);
        assert_eq!(obs.precipitation, None);
        assert_eq!(obs.wind_speed, None);
        assert_eq!(obs.temperature, Some(20.0));
    }
}
