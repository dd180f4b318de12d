//! Integration tests driving a full scrape from a wire-format snapshot.

use std::sync::Arc;

use ecobee_metrics::{
    CollectorConfig, EcobeeCollector, FakeThermostatSource, MetricCatalog, MetricsHandler,
    Observation, Thermostat, exposition,
};

const SNAPSHOT: &str = r#"[
    {
        "identifier": "t1",
        "name": "Home",
        "runtime": {
            "connected": true,
            "actualTemperature": 705,
            "desiredHeat": 680,
            "desiredCool": 760
        },
        "extendedRuntime": {
            "hvacMode": ["heatOff", "heatStage1On", "heatStage1On"],
            "heatPump1": [0, 150, 300],
            "heatPump2": [0, 0, 0],
            "auxHeat1": [0, 0, 0],
            "auxHeat2": [0, 0, 0],
            "cool1": [0, 0, 0],
            "cool2": [0, 0, 0],
            "fan": [0, 150, 300],
            "humidifier": [0, 0, 0],
            "dehumidifier": [0, 0, 0],
            "economizer": [0, 0, 0],
            "ventilator": [0, 0, 45]
        },
        "settings": { "hvacMode": "heat" },
        "weather": {
            "weatherStation": "ENV:CYYZ",
            "forecasts": [
                {
                    "dateTime": "2026-10-19 09:00:00",
                    "condition": "Mostly sunny",
                    "temperature": 52,
                    "pressure": 1013,
                    "relativeHumidity": 45,
                    "dewpoint": 312,
                    "visibility": 24000,
                    "windSpeed": 12,
                    "windGust": 25,
                    "windDirection": "NW",
                    "windBearing": 315,
                    "pop": 10,
                    "tempHigh": 580,
                    "tempLow": 410,
                    "sky": 3
                }
            ]
        },
        "remoteSensors": [
            {
                "id": "s1",
                "name": "Bedroom",
                "type": "ecobee3_remote_sensor",
                "inUse": true,
                "capability": [
                    { "id": "1", "type": "temperature", "value": "705" },
                    { "id": "2", "type": "occupancy", "value": "true" }
                ]
            },
            {
                "id": "ei:0",
                "name": "Home",
                "type": "thermostat",
                "inUse": false,
                "capability": [
                    { "id": "1", "type": "temperature", "value": "unknown" },
                    { "id": "2", "type": "humidity", "value": "41" },
                    { "id": "3", "type": "occupancy", "value": "false" },
                    { "id": "4", "type": "airQuality", "value": "20" }
                ]
            }
        ]
    },
    {
        "identifier": "t2",
        "name": "Cabin",
        "runtime": { "connected": false, "actualTemperature": 550 },
        "remoteSensors": [
            {
                "id": "s9",
                "name": "Loft",
                "type": "ecobee3_remote_sensor",
                "inUse": true,
                "capability": [
                    { "id": "1", "type": "temperature", "value": "612" }
                ]
            }
        ]
    }
]"#;

fn snapshot() -> Vec<Thermostat> {
    serde_json::from_str(SNAPSHOT).unwrap()
}

fn collector(source: FakeThermostatSource) -> EcobeeCollector<FakeThermostatSource> {
    EcobeeCollector::new(source, Arc::new(MetricCatalog::new("ecobee").unwrap()))
}

fn find<'a>(observations: &'a [Observation], name: &str, labels: &[&str]) -> Option<&'a Observation> {
    observations
        .iter()
        .find(|o| o.name() == name && o.label_values == labels)
}

#[tokio::test]
async fn test_full_scrape_maps_every_block() {
    let collector = collector(FakeThermostatSource::with_thermostats(snapshot()));

    let scrape = collector.scrape().await;
    let obs = &scrape.observations;

    assert!(!scrape.fetch_failed);
    assert_eq!(obs[0].name(), "ecobee_fetch_time");

    let actual = find(obs, "ecobee_actual_temperature", &["t1", "Home"]).unwrap();
    assert!((actual.value - 70.5).abs() < f64::EPSILON);

    let bedroom = find(
        obs,
        "ecobee_temperature",
        &["t1", "Home", "s1", "Bedroom", "ecobee3_remote_sensor"],
    )
    .unwrap();
    assert!((bedroom.value - 70.5).abs() < f64::EPSILON);

    let ventilator = find(
        obs,
        "ecobee_extended_runtime_seconds",
        &["t1", "Home", "ventilatorOn", "ventilator"],
    )
    .unwrap();
    assert!((ventilator.value - 45.0).abs() < f64::EPSILON);

    assert!(find(obs, "ecobee_weather_sky", &["t1", "Home", "MOSTLY_SUNNY"]).is_some());
    assert!(find(obs, "ecobee_weather_condition", &["t1", "Home", "Mostly sunny"]).is_some());
    let dewpoint = find(obs, "ecobee_weather_dewpoint", &["t1", "Home"]).unwrap();
    assert!((dewpoint.value - 31.2).abs() < 1e-9);
}

#[tokio::test]
async fn test_bad_sensor_value_drops_only_that_observation() {
    let collector = collector(FakeThermostatSource::with_thermostats(snapshot()));

    let scrape = collector.scrape().await;
    let obs = &scrape.observations;
    let builtin = ["t1", "Home", "ei:0", "Home", "thermostat"];

    assert!(find(obs, "ecobee_temperature", &builtin).is_none());
    assert!(find(obs, "ecobee_humidity", &builtin).is_some());
    assert!(find(obs, "ecobee_occupancy", &builtin).is_some());
    let in_use = find(obs, "ecobee_in_use", &builtin).unwrap();
    assert!(in_use.value.abs() < f64::EPSILON);
    assert_eq!(scrape.field_errors.len(), 1);
}

#[tokio::test]
async fn test_disconnected_thermostat_reports_sensors_only() {
    let collector = collector(FakeThermostatSource::with_thermostats(snapshot()));

    let scrape = collector.scrape().await;

    let cabin: Vec<&Observation> = scrape
        .observations
        .iter()
        .filter(|o| o.label("thermostat_id") == Some("t2"))
        .collect();
    assert_eq!(cabin.len(), 2);
    assert!(cabin.iter().all(|o| o.label("sensor_id") == Some("s9")));
}

#[tokio::test]
async fn test_failed_fetch_reports_latency_only() {
    let collector = collector(FakeThermostatSource::failing("401 unauthorized"));

    let observations = collector.collect().await;

    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0].name(), "ecobee_fetch_time");
    assert!(observations[0].value >= 0.0);
}

#[tokio::test]
async fn test_weather_disabled() {
    let collector = collector(FakeThermostatSource::with_thermostats(snapshot()))
        .with_config(CollectorConfig {
            include_weather: false,
        });

    let observations = collector.collect().await;

    assert!(observations.iter().all(|o| !o.name().starts_with("ecobee_weather")));
    assert!(find(&observations, "ecobee_actual_temperature", &["t1", "Home"]).is_some());
}

#[tokio::test]
async fn test_exposition_of_full_scrape() {
    let handler = MetricsHandler::new(collector(FakeThermostatSource::with_thermostats(snapshot())));

    let response = handler.handle().await.unwrap();
    let body = response.body;

    assert_eq!(response.content_type, exposition::CONTENT_TYPE);
    assert!(body.contains(
        "ecobee_actual_temperature{thermostat_id=\"t1\",thermostat_name=\"Home\"} 70.5"
    ));
    assert!(body.contains(
        "ecobee_occupancy{thermostat_id=\"t1\",thermostat_name=\"Home\",sensor_id=\"s1\",sensor_name=\"Bedroom\",sensor_type=\"ecobee3_remote_sensor\"} 1.0"
    ));
    for descriptor in handler.collector().describe() {
        assert!(body.contains(&format!("# TYPE {} gauge", descriptor.name())));
    }
}

#[tokio::test]
async fn test_describe_unchanged_by_scrapes() {
    let source = FakeThermostatSource::with_thermostats(snapshot());
    let collector = collector(source.clone());

    let before: Vec<String> = collector.describe().iter().map(|d| d.name().to_string()).collect();
    collector.collect().await;
    source.set_thermostats(Vec::new());
    collector.collect().await;
    let after: Vec<String> = collector.describe().iter().map(|d| d.name().to_string()).collect();

    assert_eq!(before, after);
    assert_eq!(source.fetch_count(), 2);
}
