//! Error types for the exporter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ecobee_client::ClientError;
use ecobee_metrics::MetricsError;
use thiserror::Error;

/// Result type alias for exporter operations.
pub type ExporterResult<T> = Result<T, ExporterError>;

/// Errors that can occur in the exporter.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failed to bind to the listen address.
    #[error("failed to bind to {0}: {1}")]
    Bind(std::net::SocketAddr, std::io::Error),

    /// The HTTP server failed.
    #[error("server error: {0}")]
    Serve(String),

    /// ecobee API client error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Metrics catalog or encoding error.
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ExporterError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
