//! Raw api.weather.gov payloads as they arrive from a fetch or a peer push
//!
//! Only the fields the derivation needs are modelled. The rest of each
//! document object is collected into its `extra` map and serialized back
//! unchanged, so a payload republished to peers keeps what upstream sent.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::NoaaCurrentError;
use crate::weather::sampler::{self, Effective, Span};

/// Unit code api.weather.gov uses for km/h quantities
const UOM_KM_PER_HOUR: &str = "wmoUnit:km_h-1";

/// Unmodelled members of a JSON object
pub type Extra = Map<String, Value>;

/// Response of `GET /points/{lat},{lon}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGridpointPayload {
    pub properties: GridpointProperties,
    /// Fields not modelled above, written back unchanged
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridpointProperties {
    /// Forecast office identifier (e.g. "LOT")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_y: Option<u32>,
    /// URL of the forecast office resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_office: Option<String>,
    /// Follow-up URL for the raw gridpoint time series
    pub forecast_grid_data: String,
    /// Follow-up URL for the hourly forecast
    pub forecast_hourly: String,
    pub relative_location: RelativeLocation,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeLocation {
    pub properties: CityState,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityState {
    pub city: String,
    pub state: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl RawGridpointPayload {
    /// "City, ST" display name
    #[must_use]
    pub fn location_name(&self) -> String {
        let place = &self.properties.relative_location.properties;
        format!("{}, {}", place.city, place.state)
    }
}

/// Response of `GET {forecastGridData}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservationPayload {
    pub properties: ObservationProperties,
    /// Fields not modelled above, written back unchanged
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    /// Degrees Celsius
    #[serde(default)]
    pub temperature: QuantitativeSeries,
    /// Percent
    #[serde(default)]
    pub relative_humidity: QuantitativeSeries,
    /// Degrees Celsius
    #[serde(default)]
    pub apparent_temperature: QuantitativeSeries,
    /// m/s unless `uom` says km/h
    #[serde(default)]
    pub wind_speed: QuantitativeSeries,
    /// Degrees from north
    #[serde(default)]
    pub wind_direction: QuantitativeSeries,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One gridpoint property: a unit code and its time series
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuantitativeSeries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    #[serde(default)]
    pub values: Vec<Measurement>,
}

impl QuantitativeSeries {
    /// Value in effect at `now`, see [`sampler::sample_latest_effective`]
    #[must_use]
    pub fn latest_at(&self, now: DateTime<Utc>) -> Option<f64> {
        sampler::sample_latest_effective(&self.values, now)
    }
}

/// A single `{validTime, value}` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub valid_time: ValidTime,
    #[serde(default)]
    pub value: Option<f64>,
}

impl Effective for Measurement {
    type Value = f64;

    fn starts_at(&self) -> DateTime<Utc> {
        self.valid_time.start
    }

    fn value(&self) -> Option<f64> {
        self.value
    }
}

/// ISO-8601 interval such as `2024-03-01T06:00:00+00:00/PT2H`.
///
/// Only the start instant takes part in sampling; the original text is kept
/// so republished payloads carry the same interval string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidTime {
    pub start: DateTime<Utc>,
    raw: String,
}

impl ValidTime {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<String> for ValidTime {
    type Error = NoaaCurrentError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let start_text = raw.split('/').next().unwrap_or_default();
        let start = DateTime::parse_from_rfc3339(start_text)
            .map_err(|e| NoaaCurrentError::malformed(format!("invalid validTime '{raw}': {e}")))?
            .with_timezone(&Utc);
        Ok(Self { start, raw })
    }
}

impl From<ValidTime> for String {
    fn from(valid_time: ValidTime) -> Self {
        valid_time.raw
    }
}

/// Response of `GET {forecastHourly}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecastPayload {
    pub properties: ForecastProperties,
    /// Fields not modelled above, written back unchanged
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One hourly forecast period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_daytime: Option<bool>,
    /// Icon URL, e.g. `https://api.weather.gov/icons/land/day/rain_showers,40?size=small`
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_forecast: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Span for ForecastPeriod {
    fn start(&self) -> DateTime<Utc> {
        self.start_time.with_timezone(&Utc)
    }

    fn end(&self) -> DateTime<Utc> {
        self.end_time.with_timezone(&Utc)
    }
}

impl RawForecastPayload {
    /// The period covering `now`, see [`sampler::sample_containing`]
    #[must_use]
    pub fn period_at(&self, now: DateTime<Utc>) -> Option<&ForecastPeriod> {
        sampler::sample_containing(&self.properties.periods, now)
    }
}

/// Point-in-time values sampled from an observation payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentReadings {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub apparent_temperature_c: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    pub wind_direction_deg: Option<f64>,
}

impl RawObservationPayload {
    /// Sample every property at `now`
    #[must_use]
    pub fn readings_at(&self, now: DateTime<Utc>) -> CurrentReadings {
        let props = &self.properties;
        let wind_speed = props.wind_speed.latest_at(now).map(|speed| {
            match props.wind_speed.uom.as_deref() {
                Some(UOM_KM_PER_HOUR) => speed / 3.6,
                _ => speed,
            }
        });

        CurrentReadings {
            temperature_c: props.temperature.latest_at(now),
            humidity_pct: props.relative_humidity.latest_at(now),
            apparent_temperature_c: props.apparent_temperature.latest_at(now),
            wind_speed_ms: wind_speed,
            wind_direction_deg: props.wind_direction.latest_at(now),
        }
    }
}
