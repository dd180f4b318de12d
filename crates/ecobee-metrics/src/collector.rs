//! The collection engine.
//!
//! One [`EcobeeCollector::collect`] call performs one fetch and walks the
//! returned snapshot: thermostats, runtime, extended runtime, the first
//! forecast, then remote sensors and their capabilities. Problems with a
//! single field are logged and drop only that observation.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::catalog::{MetricCatalog, extend};
use crate::error::MetricsError;
use crate::mapping::{CapabilityKind, LATEST_INTERVAL, Mechanism, sky_condition};
use crate::model::{Capability, Forecast, RemoteSensor, Selection, Thermostat};
use crate::source::ThermostatSource;
use crate::types::{MetricDescriptor, Observation};

/// Value carried by label-as-payload observations.
pub const PAYLOAD_VALUE: f64 = 1.0;

/// Options controlling what each scrape requests and emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Request and emit the weather forecast block.
    pub include_weather: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            include_weather: true,
        }
    }
}

impl CollectorConfig {
    /// Returns the selection sent to the source.
    #[must_use]
    pub fn selection(&self) -> Selection {
        Selection::registered(self.include_weather)
    }
}

/// Result of one scrape.
#[derive(Debug, Default)]
pub struct Scrape {
    /// Observations in emission order.
    pub observations: Vec<Observation>,
    /// Field-level problems that were logged and skipped.
    pub field_errors: Vec<MetricsError>,
    /// Whether the fetch itself failed.
    pub fetch_failed: bool,
}

impl Scrape {
    /// Returns the observations for the named metric.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Vec<&Observation> {
        self.observations.iter().filter(|o| o.name() == name).collect()
    }
}

/// Collector gathering ecobee metrics on demand.
#[derive(Debug)]
pub struct EcobeeCollector<S> {
    source: S,
    catalog: Arc<MetricCatalog>,
    config: CollectorConfig,
}

impl<S: ThermostatSource> EcobeeCollector<S> {
    /// Creates a collector reading from `source` and emitting against `catalog`.
    #[must_use]
    pub fn new(source: S, catalog: Arc<MetricCatalog>) -> Self {
        Self {
            source,
            catalog,
            config: CollectorConfig::default(),
        }
    }

    /// Sets the collector options.
    #[must_use]
    pub fn with_config(mut self, config: CollectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<MetricCatalog> {
        &self.catalog
    }

    /// Returns the source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns every descriptor this collector can emit.
    #[must_use]
    pub fn describe(&self) -> Vec<Arc<MetricDescriptor>> {
        self.catalog.describe()
    }

    /// Fetches a snapshot and returns its observations.
    pub async fn collect(&self) -> Vec<Observation> {
        self.scrape().await.observations
    }

    /// Fetches a snapshot and returns the observations together with any
    /// field-level errors.
    pub async fn scrape(&self) -> Scrape {
        let selection = self.config.selection();

        let start = Instant::now();
        let result = self.source.fetch(&selection).await;
        let elapsed = start.elapsed();

        let mut walk = Walk::new(&self.catalog);
        walk.emit(&self.catalog.fetch_time, elapsed.as_secs_f64(), Vec::new());

        match result {
            Ok(thermostats) => {
                for thermostat in &thermostats {
                    walk.thermostat(thermostat, self.config.include_weather);
                }
                debug!(
                    thermostat_count = thermostats.len(),
                    observation_count = walk.scrape.observations.len(),
                    field_error_count = walk.scrape.field_errors.len(),
                    elapsed_secs = elapsed.as_secs_f64(),
                    "collected ecobee metrics"
                );
            }
            Err(e) => {
                error!(error = %e, elapsed_secs = elapsed.as_secs_f64(), "failed to fetch thermostats");
                walk.scrape.fetch_failed = true;
            }
        }

        walk.scrape
    }
}

/// Maps a snapshot to observations without fetching.
///
/// No `fetch_time` observation is produced.
#[must_use]
pub fn map_snapshot(catalog: &MetricCatalog, thermostats: &[Thermostat], config: CollectorConfig) -> Scrape {
    let mut walk = Walk::new(catalog);
    for thermostat in thermostats {
        walk.thermostat(thermostat, config.include_weather);
    }
    walk.scrape
}

fn tenths(raw: i64) -> f64 {
    raw as f64 / 10.0
}

/// State threaded through one walk.
struct Walk<'a> {
    catalog: &'a MetricCatalog,
    scrape: Scrape,
}

impl<'a> Walk<'a> {
    fn new(catalog: &'a MetricCatalog) -> Self {
        Self {
            catalog,
            scrape: Scrape::default(),
        }
    }

    fn emit(&mut self, descriptor: &Arc<MetricDescriptor>, value: f64, label_values: Vec<String>) {
        self.scrape
            .observations
            .push(Observation::new(descriptor, value, label_values));
    }

    fn thermostat(&mut self, t: &Thermostat, include_weather: bool) {
        let runtime = vec![t.identifier.clone(), t.name.clone()];

        if t.is_connected() {
            self.runtime(t, &runtime);
            self.extended_runtime(t, &runtime);
            if include_weather {
                self.weather(t, &runtime);
            }
        } else {
            debug!(thermostat_id = %t.identifier, "thermostat disconnected, skipping runtime");
        }

        for sensor in &t.remote_sensors {
            self.sensor(sensor, &runtime);
        }
    }

    fn runtime(&mut self, t: &Thermostat, runtime: &[String]) {
        let c = self.catalog;
        self.emit(&c.actual_temperature, tenths(t.runtime.actual_temperature), runtime.to_vec());
        self.emit(&c.target_temperature_max, tenths(t.runtime.desired_cool), runtime.to_vec());
        self.emit(&c.target_temperature_min, tenths(t.runtime.desired_heat), runtime.to_vec());
        self.emit(
            &c.current_hvac_mode,
            PAYLOAD_VALUE,
            extend(runtime, &[t.settings.hvac_mode.as_str()]),
        );
    }

    fn extended_runtime(&mut self, t: &Thermostat, runtime: &[String]) {
        let c = self.catalog;
        let extended = &t.extended_runtime;

        for mechanism in Mechanism::ALL {
            let Some(&seconds) = mechanism.series(extended).get(LATEST_INTERVAL) else {
                self.unexpected(mechanism.name(), format!("{:?}", mechanism.series(extended)));
                continue;
            };
            self.emit(
                &c.extended_runtime,
                seconds as f64,
                extend(runtime, &[mechanism.stage(), mechanism.name()]),
            );
        }

        match extended.hvac_mode.get(LATEST_INTERVAL) {
            Some(mode) => self.emit(
                &c.last_interval_energized_stage,
                PAYLOAD_VALUE,
                extend(runtime, &[mode.as_str()]),
            ),
            None => self.unexpected("hvacMode", format!("{:?}", extended.hvac_mode)),
        }
    }

    fn weather(&mut self, t: &Thermostat, runtime: &[String]) {
        let Some(f) = t.weather.forecasts.first() else {
            debug!(thermostat_id = %t.identifier, "no weather forecast available");
            return;
        };
        self.forecast(f, runtime);
    }

    fn forecast(&mut self, f: &Forecast, runtime: &[String]) {
        let c = self.catalog;

        let numeric = [
            (&c.weather_temperature, f.temperature as f64),
            (&c.weather_pressure, f.pressure as f64),
            (&c.weather_relative_humidity, f.relative_humidity as f64),
            (&c.weather_dewpoint, tenths(f.dewpoint)),
            (&c.weather_temperature_high, tenths(f.temp_high)),
            (&c.weather_temperature_low, tenths(f.temp_low)),
            (&c.weather_visibility, f.visibility as f64),
            (&c.weather_wind_speed, f.wind_speed as f64),
            (&c.weather_wind_gust, f.wind_gust as f64),
            (&c.weather_wind_bearing, f.wind_bearing as f64),
            (&c.weather_pop, f.pop as f64),
        ];
        for (descriptor, value) in numeric {
            self.emit(descriptor, value, runtime.to_vec());
        }

        self.emit(&c.weather_condition, PAYLOAD_VALUE, extend(runtime, &[f.condition.as_str()]));
        self.emit(
            &c.weather_wind_direction,
            PAYLOAD_VALUE,
            extend(runtime, &[f.wind_direction.as_str()]),
        );

        match sky_condition(f.sky) {
            Some(sky) => self.emit(&c.weather_sky, PAYLOAD_VALUE, extend(runtime, &[sky])),
            None => self.unexpected("sky", f.sky.to_string()),
        }
    }

    fn sensor(&mut self, s: &RemoteSensor, runtime: &[String]) {
        let c = self.catalog;
        let sensor = extend(runtime, &[s.id.as_str(), s.name.as_str(), s.sensor_type.as_str()]);

        let in_use = f64::from(u8::from(s.in_use));
        self.emit(&c.in_use, in_use, sensor.clone());

        for capability in &s.capability {
            self.capability(capability, &sensor);
        }
    }

    fn capability(&mut self, capability: &Capability, sensor: &[String]) {
        let c = self.catalog;
        let value = capability.value.as_str();

        match CapabilityKind::from(capability.capability_type.as_str()) {
            CapabilityKind::Temperature => {
                if let Some(v) = self.parse("temperature", value) {
                    self.emit(&c.temperature, v / 10.0, sensor.to_vec());
                }
            }
            CapabilityKind::Humidity => {
                if let Some(v) = self.parse("humidity", value) {
                    self.emit(&c.humidity, v, sensor.to_vec());
                }
            }
            CapabilityKind::Occupancy => match value {
                "true" => self.emit(&c.occupancy, 1.0, sensor.to_vec()),
                "false" => self.emit(&c.occupancy, 0.0, sensor.to_vec()),
                other => self.unexpected("occupancy", other.to_string()),
            },
            CapabilityKind::Other(kind) => {
                info!(capability = %kind, "ignoring sensor capability");
            }
        }
    }

    fn parse(&mut self, field: &'static str, value: &str) -> Option<f64> {
        match value.parse::<f64>() {
            Ok(v) => Some(v),
            Err(source) => {
                let err = MetricsError::FieldParse {
                    field,
                    value: value.to_string(),
                    source,
                };
                warn!(error = %err, "skipping unparseable sensor value");
                self.scrape.field_errors.push(err);
                None
            }
        }
    }

    fn unexpected(&mut self, field: &'static str, value: String) {
        let err = MetricsError::UnexpectedValue { field, value };
        error!(error = %err, "skipping unexpected value");
        self.scrape.field_errors.push(err);
    }
}
