use crate::handlers;
use crate::models::*;
use axum::{http::StatusCode, response::IntoResponse, Json};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FloodGuard Risk API",
        description = "Flood risk scoring and financial loss estimation"
    ),
    paths(
        handlers::health,
        handlers::predict,
        handlers::prediction_report,
        handlers::financial_risk,
        handlers::location_risk,
        handlers::model_status,
    ),
    components(schemas(
        WeatherObservation,
        RiskLevel,
        RiskCategory,
        FinancialRiskLevel,
        LocationAttributes,
        FinancialEstimate,
        ExposureEstimate,
        PredictRequest,
        PredictResponse,
        PredictionReportRequest,
        PredictionReport,
        FinancialRiskRequest,
        FinancialRiskResponse,
        FloodRiskReport,
        ModelStatus,
    )),
    tags(
        (name = "scoring", description = "Flood risk scoring"),
        (name = "financial", description = "Loss estimation"),
        (name = "system", description = "Health and model status")
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn serve_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Serves the Swagger UI HTML page.
///
/// The page loads the document served by [`serve_openapi_spec`].
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>FloodGuard Risk API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}
