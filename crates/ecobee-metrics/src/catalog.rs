//! The fixed catalog of metric descriptors.
//!
//! All descriptors are declared once, up front, from a caller-supplied prefix.
//! Two collectors with the same prefix produce colliding names, so each
//! exporter process should build exactly one catalog.

use std::sync::Arc;

use crate::error::Result;
use crate::types::{MetricDescriptor, MetricName};

/// Label names shared by every thermostat-scoped metric.
pub const RUNTIME_LABELS: [&str; 2] = ["thermostat_id", "thermostat_name"];

/// Label names appended to [`RUNTIME_LABELS`] for sensor-scoped metrics.
pub const SENSOR_LABELS: [&str; 3] = ["sensor_id", "sensor_name", "sensor_type"];

/// Returns `base` followed by `extra`, as a fresh vector.
pub(crate) fn extend(base: &[String], extra: &[&str]) -> Vec<String> {
    base.iter()
        .cloned()
        .chain(extra.iter().map(|s| (*s).to_string()))
        .collect()
}

/// Immutable set of descriptors, built once per process.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    prefix: String,

    // per-query
    pub(crate) fetch_time: Arc<MetricDescriptor>,

    // runtime
    pub(crate) actual_temperature: Arc<MetricDescriptor>,
    pub(crate) target_temperature_min: Arc<MetricDescriptor>,
    pub(crate) target_temperature_max: Arc<MetricDescriptor>,
    pub(crate) current_hvac_mode: Arc<MetricDescriptor>,

    // extended runtime
    pub(crate) extended_runtime: Arc<MetricDescriptor>,
    pub(crate) last_interval_energized_stage: Arc<MetricDescriptor>,

    // weather
    pub(crate) weather_temperature: Arc<MetricDescriptor>,
    pub(crate) weather_pressure: Arc<MetricDescriptor>,
    pub(crate) weather_relative_humidity: Arc<MetricDescriptor>,
    pub(crate) weather_dewpoint: Arc<MetricDescriptor>,
    pub(crate) weather_temperature_high: Arc<MetricDescriptor>,
    pub(crate) weather_temperature_low: Arc<MetricDescriptor>,
    pub(crate) weather_visibility: Arc<MetricDescriptor>,
    pub(crate) weather_wind_speed: Arc<MetricDescriptor>,
    pub(crate) weather_wind_gust: Arc<MetricDescriptor>,
    pub(crate) weather_wind_bearing: Arc<MetricDescriptor>,
    pub(crate) weather_pop: Arc<MetricDescriptor>,
    pub(crate) weather_condition: Arc<MetricDescriptor>,
    pub(crate) weather_wind_direction: Arc<MetricDescriptor>,
    pub(crate) weather_sky: Arc<MetricDescriptor>,

    // sensors
    pub(crate) temperature: Arc<MetricDescriptor>,
    pub(crate) humidity: Arc<MetricDescriptor>,
    pub(crate) occupancy: Arc<MetricDescriptor>,
    pub(crate) in_use: Arc<MetricDescriptor>,
}

impl MetricCatalog {
    /// Declares every descriptor under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::InvalidMetricName` if `prefix` does not form
    /// valid metric names.
    pub fn new(prefix: &str) -> Result<Self> {
        MetricName::new(prefix)?;

        let new = |suffix: &str, help: &str, labels: Vec<String>| -> Result<Arc<MetricDescriptor>> {
            let name = MetricName::qualified(prefix, suffix)?;
            Ok(Arc::new(MetricDescriptor::new(name, help, labels)))
        };

        let runtime = extend(&[], &RUNTIME_LABELS);
        let sensor = extend(&runtime, &SENSOR_LABELS);

        Ok(Self {
            prefix: prefix.to_string(),

            fetch_time: new(
                "fetch_time",
                "elapsed time fetching data via Ecobee API",
                Vec::new(),
            )?,

            actual_temperature: new(
                "actual_temperature",
                "thermostat-averaged current temperature",
                runtime.clone(),
            )?,
            target_temperature_min: new(
                "target_temperature_min",
                "minimum temperature for thermostat to maintain",
                runtime.clone(),
            )?,
            target_temperature_max: new(
                "target_temperature_max",
                "maximum temperature for thermostat to maintain",
                runtime.clone(),
            )?,
            current_hvac_mode: new(
                "currenthvacmode",
                "current hvac mode of thermostat",
                extend(&runtime, &["current_hvac_mode"]),
            )?,

            extended_runtime: new(
                "extended_runtime_seconds",
                "seconds an equipment stage was energized during the most recent 5-minute interval",
                extend(&runtime, &["stage", "mechanism"]),
            )?,
            last_interval_energized_stage: new(
                "last_interval_energized_stage",
                "hvac mode reported for the most recent 5-minute interval",
                extend(&runtime, &["hvac_mode"]),
            )?,

            weather_temperature: new(
                "weather_temperature",
                "forecast temperature",
                runtime.clone(),
            )?,
            weather_pressure: new(
                "weather_pressure",
                "forecast barometric pressure",
                runtime.clone(),
            )?,
            weather_relative_humidity: new(
                "weather_relative_humidity",
                "forecast relative humidity in percent",
                runtime.clone(),
            )?,
            weather_dewpoint: new(
                "weather_dewpoint",
                "forecast dewpoint in degrees",
                runtime.clone(),
            )?,
            weather_temperature_high: new(
                "weather_temperature_high",
                "forecast high temperature in degrees",
                runtime.clone(),
            )?,
            weather_temperature_low: new(
                "weather_temperature_low",
                "forecast low temperature in degrees",
                runtime.clone(),
            )?,
            weather_visibility: new(
                "weather_visibility",
                "forecast visibility in meters",
                runtime.clone(),
            )?,
            weather_wind_speed: new(
                "weather_wind_speed",
                "forecast wind speed",
                runtime.clone(),
            )?,
            weather_wind_gust: new(
                "weather_wind_gust",
                "forecast wind gust speed",
                runtime.clone(),
            )?,
            weather_wind_bearing: new(
                "weather_wind_bearing",
                "forecast wind bearing in degrees",
                runtime.clone(),
            )?,
            weather_pop: new(
                "weather_pop",
                "forecast probability of precipitation in percent",
                runtime.clone(),
            )?,
            weather_condition: new(
                "weather_condition",
                "forecast weather condition",
                extend(&runtime, &["condition"]),
            )?,
            weather_wind_direction: new(
                "weather_wind_direction",
                "forecast compass wind direction",
                extend(&runtime, &["wind_direction"]),
            )?,
            weather_sky: new(
                "weather_sky",
                "forecast sky condition",
                extend(&runtime, &["sky"]),
            )?,

            temperature: new(
                "temperature",
                "temperature reported by a sensor in degrees",
                sensor.clone(),
            )?,
            humidity: new(
                "humidity",
                "humidity reported by a sensor in percent",
                sensor.clone(),
            )?,
            occupancy: new(
                "occupancy",
                "occupancy reported by a sensor (0 or 1)",
                sensor.clone(),
            )?,
            in_use: new(
                "in_use",
                "is sensor being used in thermostat calculations (0 or 1)",
                sensor,
            )?,
        })
    }

    /// Returns the prefix shared by every descriptor.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns every descriptor the collector can emit, in a fixed order.
    #[must_use]
    pub fn describe(&self) -> Vec<Arc<MetricDescriptor>> {
        [
            &self.fetch_time,
            &self.actual_temperature,
            &self.target_temperature_min,
            &self.target_temperature_max,
            &self.current_hvac_mode,
            &self.extended_runtime,
            &self.last_interval_energized_stage,
            &self.weather_temperature,
            &self.weather_pressure,
            &self.weather_relative_humidity,
            &self.weather_dewpoint,
            &self.weather_temperature_high,
            &self.weather_temperature_low,
            &self.weather_visibility,
            &self.weather_wind_speed,
            &self.weather_wind_gust,
            &self.weather_wind_bearing,
            &self.weather_pop,
            &self.weather_condition,
            &self.weather_wind_direction,
            &self.weather_sky,
            &self.temperature,
            &self.humidity,
            &self.occupancy,
            &self.in_use,
        ]
        .into_iter()
        .map(Arc::clone)
        .collect()
    }

    /// Looks up a descriptor by its qualified name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<MetricDescriptor>> {
        self.describe()
            .into_iter()
            .find(|d| d.name().as_str() == name)
    }
}
