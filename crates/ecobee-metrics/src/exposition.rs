//! OpenMetrics exposition of a scrape.
//!
//! Each scrape builds a one-shot prometheus-client [`Registry`] holding a
//! collector over the catalog and that scrape's observations, then encodes it.
//!
//! # Example
//!
//! ```rust
//! use ecobee_metrics::{MetricCatalog, exposition};
//!
//! let catalog = MetricCatalog::new("ecobee").unwrap();
//! let body = exposition::encode(&catalog, Vec::new()).unwrap();
//! assert!(body.contains("# TYPE ecobee_fetch_time gauge"));
//! ```

use std::fmt::Write as _;
use std::io::Write;
use std::sync::Arc;

use prometheus_client::collector::Collector;
use prometheus_client::encoding::{
    DescriptorEncoder, EncodeLabelValue, EncodeMetric, LabelValueEncoder,
};
use prometheus_client::metrics::MetricType;
use prometheus_client::metrics::gauge::ConstGauge;
use prometheus_client::registry::Registry;
use tracing::error;

use crate::catalog::MetricCatalog;
use crate::collector::EcobeeCollector;
use crate::error::{MetricsError, Result};
use crate::source::ThermostatSource;
use crate::types::{MetricDescriptor, Observation};

/// Content type of the encoded exposition.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Label value escaped for the text format.
///
/// Backslash, double quote and newline are written as `\\`, `\"` and `\n`.
#[derive(Debug)]
struct EscapedLabelValue<'a>(&'a str);

impl EncodeLabelValue for EscapedLabelValue<'_> {
    fn encode(
        &self,
        encoder: &mut LabelValueEncoder<'_>,
    ) -> std::result::Result<(), std::fmt::Error> {
        for c in self.0.chars() {
            match c {
                '\\' => encoder.write_str("\\\\")?,
                '"' => encoder.write_str("\\\"")?,
                '\n' => encoder.write_str("\\n")?,
                c => encoder.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// Collector over one scrape's observations.
#[derive(Debug)]
struct ScrapeCollector {
    descriptors: Vec<Arc<MetricDescriptor>>,
    observations: Vec<Observation>,
}

impl Collector for ScrapeCollector {
    fn encode(&self, mut encoder: DescriptorEncoder) -> std::result::Result<(), std::fmt::Error> {
        for descriptor in &self.descriptors {
            let mut metric_encoder = encoder.encode_descriptor(
                descriptor.name().as_str(),
                descriptor.help(),
                None,
                MetricType::Gauge,
            )?;

            let mut samples = self
                .observations
                .iter()
                .filter(|o| o.name() == descriptor.name().as_str());

            if descriptor.label_names().is_empty() {
                if let Some(obs) = samples.next() {
                    ConstGauge::new(obs.value).encode(metric_encoder)?;
                }
                continue;
            }

            for obs in samples {
                let pairs = obs.label_pairs();
                let labels: Vec<(&str, EscapedLabelValue<'_>)> = pairs
                    .iter()
                    .map(|(name, value)| (name.as_str(), EscapedLabelValue(value)))
                    .collect();
                ConstGauge::new(obs.value).encode(metric_encoder.encode_family(&labels)?)?;
            }
        }
        Ok(())
    }
}

/// Encodes every descriptor of `catalog` with the given observations.
///
/// # Errors
///
/// Returns `MetricsError::Encode` if the text encoder fails.
pub fn encode(catalog: &MetricCatalog, observations: Vec<Observation>) -> Result<String> {
    let mut registry = Registry::default();
    registry.register_collector(Box::new(ScrapeCollector {
        descriptors: catalog.describe(),
        observations,
    }));

    let mut buffer = String::new();
    prometheus_client::encoding::text::encode(&mut buffer, &registry).map_err(|e| {
        MetricsError::Encode {
            reason: e.to_string(),
        }
    })?;
    Ok(buffer)
}

/// Scrapes a collector and encodes the result.
#[derive(Debug)]
pub struct MetricsHandler<S> {
    collector: Arc<EcobeeCollector<S>>,
}

impl<S> Clone for MetricsHandler<S> {
    fn clone(&self) -> Self {
        Self {
            collector: Arc::clone(&self.collector),
        }
    }
}

impl<S: ThermostatSource> MetricsHandler<S> {
    /// Creates a handler over `collector`.
    #[must_use]
    pub fn new(collector: EcobeeCollector<S>) -> Self {
        Self {
            collector: Arc::new(collector),
        }
    }

    /// Returns the underlying collector.
    #[must_use]
    pub fn collector(&self) -> &EcobeeCollector<S> {
        &self.collector
    }

    /// Performs one scrape and returns the encoded exposition.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Encode` if encoding fails.
    pub async fn handle(&self) -> Result<MetricsResponse> {
        let scrape = self.collector.scrape().await;
        let body = encode(self.collector.catalog(), scrape.observations).inspect_err(|e| {
            error!(error = %e, "failed to encode metrics");
        })?;
        Ok(MetricsResponse {
            body,
            content_type: CONTENT_TYPE.to_string(),
        })
    }

    /// Returns the content type of encoded responses.
    #[must_use]
    pub const fn content_type() -> &'static str {
        CONTENT_TYPE
    }
}

/// Response from the metrics handler.
#[derive(Debug, Clone)]
pub struct MetricsResponse {
    /// The response body in OpenMetrics text format.
    pub body: String,
    /// The Content-Type header value.
    pub content_type: String,
}

impl MetricsResponse {
    /// Returns the body as bytes.
    #[must_use]
    pub fn body_bytes(&self) -> Vec<u8> {
        self.body.clone().into_bytes()
    }

    /// Writes the response body to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.body.as_bytes())
    }
}
