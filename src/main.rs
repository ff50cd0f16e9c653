use floodguard_risk::config::Config;
use floodguard_risk::handlers::AppState;
use floodguard_risk::weather_client::WeatherClient;
use floodguard_risk::{engine, routes};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The scoring strategy (trained model or heuristic).
/// - The weather API client.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floodguard_risk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Load the model once; it is read-only from here on
    let scorer = engine::load_scorer(&config).await;

    let weather_client = match (&config.weather_api_url, &config.weather_api_key) {
        (Some(url), Some(key)) => match WeatherClient::new(url.clone(), key.clone()) {
            Ok(client) => {
                tracing::info!("✓ Weather client initialized: {}", url);
                Some(client)
            }
            Err(e) => {
                tracing::error!("Failed to initialize weather client: {}", e);
                None
            }
        },
        _ => {
            tracing::info!("Weather API not configured, live risk lookups disabled");
            None
        }
    };

    let app_state = Arc::new(AppState::new(config.clone(), scorer, weather_client));

    // Configure rate limiter per IP
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let api = routes::api_routes().layer(
        ServiceBuilder::new()
            .layer(RequestBodyLimitLayer::new(routes::MAX_BODY_BYTES))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    // Health check bypasses rate limiting
    let app = routes::app(app_state, api);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
