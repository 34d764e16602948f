//! Shared api.weather.gov fixtures for the integration tests
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use noaa_current::{
    NoaaCurrentConfig, RawForecastPayload, RawGridpointPayload, RawObservationPayload,
};

/// 12:30 CST, inside the first forecast period and after both temperature entries
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap()
}

/// Celsius value the observation fixture has in effect at [`fixture_now`]
pub const CURRENT_TEMPERATURE_C: f64 = 10.0;

pub fn config() -> NoaaCurrentConfig {
    let mut config = NoaaCurrentConfig::for_location(41.8781, -87.6298);
    config.display.timezone = Some("America/Chicago".to_string());
    config.instance_name = "living-room".to_string();
    config
}

pub fn gridpoint_json(base: &str) -> String {
    format!(
        r#"{{
        "@context": ["https://geojson.org/geojson-ld/geojson-context.jsonld"],
        "id": "{base}/points/41.8781,-87.6298",
        "type": "Feature",
        "properties": {{
            "gridId": "LOT",
            "gridX": 76,
            "gridY": 73,
            "forecastOffice": "{base}/offices/LOT",
            "forecastGridData": "{base}/gridpoints/LOT/76,73",
            "forecastHourly": "{base}/gridpoints/LOT/76,73/forecast/hourly",
            "relativeLocation": {{
                "type": "Feature",
                "properties": {{"city": "Chicago", "state": "IL"}}
            }},
            "timeZone": "America/Chicago"
        }}
    }}"#
    )
}

pub const OBSERVATION_JSON: &str = r#"{
    "type": "Feature",
    "properties": {
        "updateTime": "2024-03-01T17:42:10+00:00",
        "temperature": {"uom": "wmoUnit:degC", "values": [
            {"validTime": "2024-03-01T17:00:00+00:00/PT1H", "value": 12.2},
            {"validTime": "2024-03-01T18:00:00+00:00/PT1H", "value": 10.0},
            {"validTime": "2024-03-01T19:00:00+00:00/PT1H", "value": 8.3}
        ]},
        "relativeHumidity": {"uom": "wmoUnit:percent", "values": [
            {"validTime": "2024-03-01T17:00:00+00:00/PT3H", "value": 62.0}
        ]},
        "apparentTemperature": {"uom": "wmoUnit:degC", "values": [
            {"validTime": "2024-03-01T17:00:00+00:00/PT3H", "value": 7.5}
        ]},
        "windSpeed": {"uom": "wmoUnit:km_h-1", "values": [
            {"validTime": "2024-03-01T17:00:00+00:00/PT3H", "value": 14.8}
        ]},
        "windDirection": {"uom": "wmoUnit:degree_(angle)", "values": [
            {"validTime": "2024-03-01T17:00:00+00:00/PT3H", "value": 270.0}
        ]}
    }
}"#;

pub const FORECAST_JSON: &str = r#"{
    "type": "Feature",
    "properties": {
        "updated": "2024-03-01T17:30:00+00:00",
        "periods": [
            {"number": 1, "startTime": "2024-03-01T12:00:00-06:00", "endTime": "2024-03-01T13:00:00-06:00",
             "isDaytime": true, "shortForecast": "Chance Rain Showers",
             "icon": "https://api.weather.gov/icons/land/day/rain_showers,40?size=small"},
            {"number": 2, "startTime": "2024-03-01T13:00:00-06:00", "endTime": "2024-03-01T14:00:00-06:00",
             "isDaytime": true, "shortForecast": "Cloudy",
             "icon": "https://api.weather.gov/icons/land/day/ovc?size=small"}
        ]
    }
}"#;

pub fn gridpoint() -> Arc<RawGridpointPayload> {
    Arc::new(serde_json::from_str(&gridpoint_json("https://api.weather.gov")).unwrap())
}

pub fn observation() -> Arc<RawObservationPayload> {
    Arc::new(serde_json::from_str(OBSERVATION_JSON).unwrap())
}

pub fn forecast() -> Arc<RawForecastPayload> {
    Arc::new(serde_json::from_str(FORECAST_JSON).unwrap())
}
