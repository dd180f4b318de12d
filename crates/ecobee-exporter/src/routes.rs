//! Route configuration for the exporter.

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{Router, get};
use axum::Json;
use ecobee_metrics::{MetricsHandler, ThermostatSource};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::ExporterResult;

const LANDING_PAGE: &str = r#"<html>
<head><title>ecobee exporter</title></head>
<body>
<h1>ecobee exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>
"#;

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the server is running.
    pub status: &'static str,
}

/// Create the exporter router.
pub fn create_router<S>(handler: MetricsHandler<S>) -> Router
where
    S: ThermostatSource + 'static,
{
    Router::new()
        .route("/", get(landing_page))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(handler)
        .layer(TraceLayer::new_for_http())
}

/// Handle GET / - landing page.
async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// Handle GET /health - liveness probe.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Handle GET /metrics - scrape the thermostats and encode the result.
async fn get_metrics<S>(State(handler): State<MetricsHandler<S>>) -> ExporterResult<Response>
where
    S: ThermostatSource + 'static,
{
    let response = handler.handle().await?;
    Ok(([(header::CONTENT_TYPE, response.content_type)], response.body).into_response())
}
