//! Prometheus exporter for ecobee thermostats.
//!
//! Every request to `/metrics` fetches the current thermostat state from the
//! ecobee API and encodes it as Prometheus gauges. Nothing is cached between
//! scrapes.
//!
//! The binary has two subcommands: `serve` (the default) runs the HTTP server,
//! and `authorize` runs the PIN flow that populates the token cache.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authorize;
pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use authorize::authorize;
pub use cli::{Cli, Commands};
pub use config::ExporterConfig;
pub use error::{ExporterError, ExporterResult};
pub use routes::create_router;
pub use server::ExporterServer;
