//! Core types for the metrics system.
//!
//! This module provides the fundamental types used throughout the ecobee-metrics crate:
//! - [`MetricName`]: A validated, prefix-qualified metric name
//! - [`MetricDescriptor`]: A named, labeled metric declaration
//! - [`Observation`]: A single value emitted for a descriptor during a scrape

use std::sync::Arc;

use crate::error::{MetricsError, Result};

/// A validated metric name.
///
/// Metric names must:
/// - Be non-empty
/// - Contain only alphanumeric characters, underscores, and colons
/// - Start with a letter or underscore
/// - Be at most 256 characters long
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricName(String);

impl MetricName {
    /// Maximum allowed length for a metric name.
    pub const MAX_LENGTH: usize = 256;

    /// Creates a new validated metric name.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::InvalidMetricName` if the name is invalid.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(MetricsError::InvalidMetricName {
                reason: "metric name cannot be empty".to_string(),
            });
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(MetricsError::InvalidMetricName {
                reason: format!(
                    "metric name exceeds maximum length of {} characters",
                    Self::MAX_LENGTH
                ),
            });
        }

        if let Some(c) = name.chars().next() {
            if !c.is_ascii_alphabetic() && c != '_' {
                return Err(MetricsError::InvalidMetricName {
                    reason: format!("metric name {name:?} must start with a letter or underscore"),
                });
            }
        }

        for c in name.chars() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != ':' {
                return Err(MetricsError::InvalidMetricName {
                    reason: format!("invalid character '{c}' in metric name {name:?}"),
                });
            }
        }

        Ok(Self(name))
    }

    /// Builds the qualified name `{prefix}_{suffix}`.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::InvalidMetricName` if the joined name is invalid.
    pub fn qualified(prefix: &str, suffix: &str) -> Result<Self> {
        Self::new(format!("{prefix}_{suffix}"))
    }

    /// Returns the metric name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MetricName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A named, labeled metric declaration, independent of any value.
///
/// Descriptors are immutable once built. Every [`Observation`] made against a
/// descriptor carries exactly one label value per label name, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    name: MetricName,
    help: String,
    label_names: Vec<String>,
}

impl MetricDescriptor {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(name: MetricName, help: impl Into<String>, label_names: Vec<String>) -> Self {
        Self {
            name,
            help: help.into(),
            label_names,
        }
    }

    /// Returns the qualified metric name.
    #[must_use]
    pub fn name(&self) -> &MetricName {
        &self.name
    }

    /// Returns the help text.
    #[must_use]
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Returns the ordered label names.
    #[must_use]
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }
}

/// One concrete emission of a value for a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// The descriptor this observation belongs to.
    pub descriptor: Arc<MetricDescriptor>,
    /// The gauge value.
    pub value: f64,
    /// Label values, positionally matching `descriptor.label_names()`.
    pub label_values: Vec<String>,
}

impl Observation {
    /// Creates a new observation.
    ///
    /// The number of label values must equal the descriptor's label count.
    #[must_use]
    pub fn new(descriptor: &Arc<MetricDescriptor>, value: f64, label_values: Vec<String>) -> Self {
        debug_assert_eq!(
            descriptor.label_names().len(),
            label_values.len(),
            "label arity mismatch for {}",
            descriptor.name()
        );
        Self {
            descriptor: Arc::clone(descriptor),
            value,
            label_values,
        }
    }

    /// Returns the qualified metric name of this observation.
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name().as_str()
    }

    /// Returns the value for the named label, if the descriptor declares it.
    #[must_use]
    pub fn label(&self, label_name: &str) -> Option<&str> {
        self.descriptor
            .label_names()
            .iter()
            .position(|n| n == label_name)
            .and_then(|i| self.label_values.get(i))
            .map(String::as_str)
    }

    /// Returns `(name, value)` label pairs in schema order.
    #[must_use]
    pub fn label_pairs(&self) -> Vec<(String, String)> {
        self.descriptor
            .label_names()
            .iter()
            .cloned()
            .zip(self.label_values.iter().cloned())
            .collect()
    }
}
