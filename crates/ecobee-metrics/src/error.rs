//! Error types for the ecobee-metrics crate.

use thiserror::Error;

/// Errors that can occur while building the catalog or walking a snapshot.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The metric name is invalid (empty or contains invalid characters).
    #[error("invalid metric name: {reason}")]
    InvalidMetricName {
        /// The reason the name is invalid.
        reason: String,
    },

    /// A field that must be numeric could not be parsed.
    #[error("failed to parse {field} value {value:?}: {source}")]
    FieldParse {
        /// The field being parsed (e.g. `temperature`).
        field: &'static str,
        /// The raw value reported by the API.
        value: String,
        /// The underlying parse error.
        source: std::num::ParseFloatError,
    },

    /// An enumerated or indexed field held a value outside its domain.
    #[error("unexpected {field} value {value:?}")]
    UnexpectedValue {
        /// The field holding the value.
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// Encoding the exposition text failed.
    #[error("encode error: {reason}")]
    Encode {
        /// The reason encoding failed.
        reason: String,
    },
}

/// Result type for metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
