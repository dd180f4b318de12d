//! Thermostat snapshot model as returned by the ecobee `thermostat` endpoint.
//!
//! Field names follow the ecobee JSON wire format. Blocks the selection did not
//! ask for are absent from the response and deserialize to their defaults.

use serde::{Deserialize, Serialize};

/// Selection sent with a thermostat request.
///
/// Serializes to the `selection` object of the ecobee request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Scope of thermostats to return (`registered` for the account's devices).
    pub selection_type: String,
    /// Match expression for the selection type; empty for `registered`.
    pub selection_match: String,
    /// Include remote sensors and their capabilities.
    pub include_sensors: bool,
    /// Include the runtime block.
    pub include_runtime: bool,
    /// Include the settings block.
    pub include_settings: bool,
    /// Include the extended runtime block.
    pub include_extended_runtime: bool,
    /// Include the weather block.
    pub include_weather: bool,
}

impl Selection {
    /// Selection type covering every thermostat registered to the account.
    pub const REGISTERED: &'static str = "registered";

    /// Selection used by the collector for each scrape.
    #[must_use]
    pub fn registered(include_weather: bool) -> Self {
        Self {
            selection_type: Self::REGISTERED.to_string(),
            selection_match: String::new(),
            include_sensors: true,
            include_runtime: true,
            include_settings: true,
            include_extended_runtime: true,
            include_weather,
        }
    }
}

/// A thermostat and the blocks selected for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thermostat {
    /// Thermostat serial number.
    pub identifier: String,
    /// User-defined display name.
    pub name: String,
    /// Current runtime readings.
    pub runtime: Runtime,
    /// Last three 5-minute runtime intervals.
    pub extended_runtime: ExtendedRuntime,
    /// Thermostat settings.
    pub settings: Settings,
    /// Weather forecasts for the thermostat location.
    pub weather: Weather,
    /// Remote sensors, including the thermostat's built-in sensor.
    pub remote_sensors: Vec<RemoteSensor>,
}

impl Thermostat {
    /// Returns whether the thermostat is currently connected to the ecobee cloud.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.runtime.connected
    }
}

/// Runtime block. Temperatures are in tenths of a degree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Runtime {
    /// Whether the thermostat is connected.
    pub connected: bool,
    /// Thermostat-averaged current temperature.
    pub actual_temperature: i64,
    /// Current heat setpoint.
    pub desired_heat: i64,
    /// Current cool setpoint.
    pub desired_cool: i64,
}

/// Extended runtime block.
///
/// Each series holds the three most recent 5-minute intervals, oldest first.
/// Equipment series report seconds of runtime within the interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedRuntime {
    /// HVAC mode string for each interval.
    #[serde(rename = "hvacMode")]
    pub hvac_mode: Vec<String>,
    /// Heat pump stage 1.
    #[serde(rename = "heatPump1")]
    pub heat_pump1: Vec<i64>,
    /// Heat pump stage 2.
    #[serde(rename = "heatPump2")]
    pub heat_pump2: Vec<i64>,
    /// Auxiliary heat stage 1.
    #[serde(rename = "auxHeat1")]
    pub aux_heat1: Vec<i64>,
    /// Auxiliary heat stage 2.
    #[serde(rename = "auxHeat2")]
    pub aux_heat2: Vec<i64>,
    /// Cooling stage 1.
    #[serde(rename = "cool1")]
    pub cool1: Vec<i64>,
    /// Cooling stage 2.
    #[serde(rename = "cool2")]
    pub cool2: Vec<i64>,
    /// Fan.
    pub fan: Vec<i64>,
    /// Humidifier.
    pub humidifier: Vec<i64>,
    /// Dehumidifier.
    pub dehumidifier: Vec<i64>,
    /// Economizer.
    pub economizer: Vec<i64>,
    /// Ventilator.
    pub ventilator: Vec<i64>,
}

/// Settings block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Current HVAC mode (`auto`, `auxHeatOnly`, `cool`, `heat`, `off`).
    pub hvac_mode: String,
}

/// Weather block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Weather {
    /// Weather station identifier.
    pub weather_station: String,
    /// Forecasts; the first entry is the most accurate.
    pub forecasts: Vec<Forecast>,
}

/// A single weather forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Forecast {
    /// Forecast time.
    pub date_time: String,
    /// Free-text weather condition.
    pub condition: String,
    /// Temperature.
    pub temperature: i64,
    /// Barometric pressure.
    pub pressure: i64,
    /// Relative humidity in percent.
    pub relative_humidity: i64,
    /// Dewpoint in tenths of a degree.
    pub dewpoint: i64,
    /// Visibility in meters.
    pub visibility: i64,
    /// Wind speed.
    pub wind_speed: i64,
    /// Wind gust speed.
    pub wind_gust: i64,
    /// Compass wind direction (e.g. `NW`).
    pub wind_direction: String,
    /// Wind bearing in degrees.
    pub wind_bearing: i64,
    /// Probability of precipitation in percent.
    pub pop: i64,
    /// Forecast high in tenths of a degree.
    pub temp_high: i64,
    /// Forecast low in tenths of a degree.
    pub temp_low: i64,
    /// Sky condition index.
    pub sky: i64,
}

/// A remote (or built-in) sensor attached to a thermostat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSensor {
    /// Sensor identifier, unique per thermostat.
    pub id: String,
    /// User-defined sensor name.
    pub name: String,
    /// Sensor type (`thermostat`, `ecobee3_remote_sensor`, ...).
    #[serde(rename = "type")]
    pub sensor_type: String,
    /// Whether the sensor participates in the thermostat's averaging.
    pub in_use: bool,
    /// Values reported by the sensor.
    pub capability: Vec<Capability>,
}

/// A raw capability value reported by a sensor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capability {
    /// Capability identifier.
    pub id: String,
    /// Capability type (`temperature`, `humidity`, `occupancy`, ...).
    #[serde(rename = "type")]
    pub capability_type: String,
    /// Raw value as sent by the API.
    pub value: String,
}
