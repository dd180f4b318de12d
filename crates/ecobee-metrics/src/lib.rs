//! On-demand ecobee thermostat telemetry for Prometheus.
#![forbid(unsafe_code)]
//!
//! `ecobee-metrics` turns a snapshot of an ecobee account's thermostats into
//! gauge observations. Nothing is cached between scrapes: every collection
//! performs exactly one fetch against a [`ThermostatSource`] and maps the
//! result through a fixed [`MetricCatalog`].
//!
//! # Features
//!
//! - **Static catalog**: every descriptor is declared once, from a prefix
//! - **Fault-tolerant mapping**: a bad field drops one observation, not the scrape
//! - **Latency always reported**: `{prefix}_fetch_time` is emitted even on failure
//! - **OpenMetrics output**: encoded with `prometheus-client`
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ecobee_metrics::{EcobeeCollector, FakeThermostatSource, MetricCatalog};
//!
//! let catalog = Arc::new(MetricCatalog::new("ecobee").unwrap());
//! let collector = EcobeeCollector::new(FakeThermostatSource::new(), catalog);
//!
//! assert_eq!(collector.describe().len(), 25);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod catalog;
pub mod collector;
pub mod error;
pub mod exposition;
pub mod mapping;
pub mod model;
pub mod source;
pub mod types;

// Re-export main types at crate root
pub use catalog::MetricCatalog;
pub use collector::{CollectorConfig, EcobeeCollector, Scrape, map_snapshot};
pub use error::{MetricsError, Result};
pub use exposition::{CONTENT_TYPE, MetricsHandler, MetricsResponse};
pub use mapping::{CapabilityKind, Mechanism};
pub use model::{
    Capability, ExtendedRuntime, Forecast, RemoteSensor, Runtime, Selection, Settings, Thermostat,
    Weather,
};
pub use source::{FakeFetchError, FakeThermostatSource, ThermostatSource};
pub use types::{MetricDescriptor, MetricName, Observation};
