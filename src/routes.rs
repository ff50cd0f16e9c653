use crate::config::Config;
use crate::docs;
use crate::handlers::{self, AppState};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Maximum accepted request body size.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Scoring and documentation routes. Rate limiting is layered on by the caller.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // API Documentation
        .route("/docs", get(docs::serve_swagger_ui))
        .route("/api-docs/openapi.json", get(docs::serve_openapi_spec))
        // Scoring
        .route("/predict", post(handlers::predict))
        .route("/api/predict", post(handlers::predict))
        .route("/api/v1/predictions", post(handlers::prediction_report))
        .route("/api/v1/risk", get(handlers::location_risk))
        // Financial estimates
        .route("/financial-risk", post(handlers::financial_risk))
        .route("/api/financial-risk", post(handlers::financial_risk))
        // Model
        .route("/model/status", get(handlers::model_status))
}

/// Builds the final app: health checks outside `api`, then tracing and CORS.
pub fn app(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/health", get(handlers::health))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Permissive CORS unless explicit origins are configured.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
