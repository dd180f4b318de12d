//! Exporter HTTP server.

use std::net::SocketAddr;

use ecobee_metrics::{MetricsHandler, ThermostatSource};
use tokio::net::TcpListener;
use tracing::info;

use crate::error::{ExporterError, ExporterResult};
use crate::routes::create_router;

/// HTTP server exposing `/metrics`, `/health` and a landing page.
#[derive(Debug, Clone)]
pub struct ExporterServer {
    router: axum::Router,
}

impl ExporterServer {
    /// Create a server scraping through `handler`.
    #[must_use]
    pub fn new<S>(handler: MetricsHandler<S>) -> Self
    where
        S: ThermostatSource + 'static,
    {
        Self {
            router: create_router(handler),
        }
    }

    /// Start the server and listen for connections.
    ///
    /// This method runs until the server encounters a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self, addr: SocketAddr) -> ExporterResult<()> {
        self.serve_with_shutdown(addr, std::future::pending()).await
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server will shut down when the provided future completes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> ExporterResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ExporterError::Bind(addr, e))?;

        info!(addr = %listener.local_addr().unwrap_or(addr), "ecobee exporter listening");

        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ExporterError::Serve(e.to_string()))?;

        info!("ecobee exporter shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        self.router.clone()
    }
}
