/// Integration tests with a mocked weather API
/// Tests the weather client without hitting real external services
use floodguard_risk::errors::AppError;
use floodguard_risk::models::WeatherObservation;
use floodguard_risk::weather_client::WeatherClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(mock_server: &MockServer) -> WeatherClient {
    WeatherClient::new(
        format!("{}/data/2.5/weather", mock_server.uri()),
        "test_key".to_string(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_current_conditions_success() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "coord": { "lon": -46.63, "lat": -23.55 },
        "main": { "temp": 18.4, "humidity": 85, "pressure": 1009 },
        "wind": { "speed": 5.0, "deg": 140 },
        "rain": { "1h": 3.2 },
        "name": "São Paulo"
    });

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "-23.55"))
        .and(query_param("lon", "-46.63"))
        .and(query_param("appid", "test_key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let obs = client.current_conditions(-23.55, -46.63).await.unwrap();

    assert_eq!(obs.temperature, Some(18.4));
    assert_eq!(obs.humidity, Some(85.0));
    assert_eq!(obs.precipitation, Some(3.2));
    assert_eq!(obs.wind_speed, Some(18.0));
}

#[tokio::test]
async fn test_missing_sections_are_absent_readings() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let obs = client.current_conditions(0.0, 0.0).await.unwrap();

    assert_eq!(obs, WeatherObservation::default());
}

#[tokio::test]
async fn test_api_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.current_conditions(1.0, 1.0).await;

    match result {
        Err(AppError::ExternalApiError(msg)) => {
            assert!(msg.contains("401"));
            assert!(msg.contains("Invalid API key"));
        }
        other => panic!("Expected ExternalApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.current_conditions(1.0, 1.0).await;

    assert!(matches!(result, Err(AppError::ExternalApiError(_))));
}

#[tokio::test]
async fn test_circuit_opens_after_consecutive_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(503))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    for _ in 0..5 {
        let result = client.current_conditions(1.0, 1.0).await;
        assert!(matches!(result, Err(AppError::ExternalApiError(_))));
    }

    // Circuit is open: fails fast without reaching the server
    let result = client.current_conditions(1.0, 1.0).await;
    assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
}
