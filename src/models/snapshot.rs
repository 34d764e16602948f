//! The fused current-conditions record handed to the presentation layer

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::weather::{Cardinal, SunDisplay, UnitSystem};

/// Ready-to-present current conditions.
///
/// Built in one step from a complete set of payloads and replaced whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSnapshot {
    /// Rounded temperature in `units`
    pub temperature: String,
    pub feels_like: Option<String>,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
    /// Beaufort force 0-12
    pub wind_beaufort: Option<u8>,
    pub wind_cardinal: Option<Cardinal>,
    pub wind_degrees: Option<f64>,
    /// weather-icons class, e.g. `wi-day-showers`
    pub weather_class: String,
    pub sun: Option<SunDisplay>,
    /// "City, ST"
    pub location_name: String,
    pub units: UnitSystem,
    pub ready: bool,
    pub derived_at: DateTime<Utc>,
}

/// Indoor values pushed by a sensor peer, rounded like outdoor temperatures
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndoorReadings {
    pub temperature: Option<String>,
    pub humidity: Option<String>,
}
