//! Unit conversions and wind classification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit system temperatures are reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    #[default]
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Convert a Celsius reading into this unit system
    #[must_use]
    pub fn from_celsius(&self, celsius: f64) -> f64 {
        match self {
            UnitSystem::Metric => celsius,
            UnitSystem::Imperial => celsius_to_fahrenheit(celsius),
        }
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = crate::NoaaCurrentError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(crate::NoaaCurrentError::config(format!(
                "Unknown unit system '{value}'. Must be one of: metric, imperial"
            ))),
        }
    }
}

#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    1.8 * celsius + 32.0
}

/// Fixed-precision string: one decimal, or an integer when `round_temp` is set
#[must_use]
pub fn round_value(value: f64, round_temp: bool) -> String {
    let decimals = if round_temp { 0 } else { 1 };
    let rendered = format!("{value:.decimals$}");
    // "-0.0" and "-0" read as noise on a display
    if rendered.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        rendered.trim_start_matches('-').to_string()
    } else {
        rendered
    }
}

/// Upper km/h bounds of Beaufort forces 0 through 11
const BEAUFORT_KMH: [f64; 12] = [
    1.0, 5.0, 11.0, 19.0, 28.0, 38.0, 49.0, 61.0, 74.0, 88.0, 102.0, 117.0,
];

/// Beaufort force for a wind speed in m/s.
///
/// A speed equal to a threshold belongs to the next force.
#[must_use]
pub fn ms_to_beaufort(ms: f64) -> u8 {
    kmh_to_beaufort(ms * 3600.0 / 1000.0)
}

#[must_use]
pub fn kmh_to_beaufort(kmh: f64) -> u8 {
    BEAUFORT_KMH
        .iter()
        .position(|&limit| limit > kmh)
        .and_then(|force| u8::try_from(force).ok())
        .unwrap_or(12)
}

/// 16-point compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "&'static str")]
pub enum Cardinal {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl Cardinal {
    const CLOCKWISE_FROM_NNE: [Cardinal; 15] = [
        Cardinal::NNE,
        Cardinal::NE,
        Cardinal::ENE,
        Cardinal::E,
        Cardinal::ESE,
        Cardinal::SE,
        Cardinal::SSE,
        Cardinal::S,
        Cardinal::SSW,
        Cardinal::SW,
        Cardinal::WSW,
        Cardinal::W,
        Cardinal::WNW,
        Cardinal::NW,
        Cardinal::NNW,
    ];

    /// Map a bearing in degrees onto its 22.5° band.
    ///
    /// Bands are open below and closed above, so 33.75 is NNE and 33.76 is NE.
    /// Anything outside `(11.25, 348.75]`, including NaN, is N.
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        const HALF_BAND: f64 = 11.25;
        const BAND: f64 = 22.5;

        let mut upper = HALF_BAND;
        for direction in Self::CLOCKWISE_FROM_NNE {
            let lower = upper;
            upper += BAND;
            if degrees > lower && degrees <= upper {
                return direction;
            }
        }
        Cardinal::N
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinal::N => "N",
            Cardinal::NNE => "NNE",
            Cardinal::NE => "NE",
            Cardinal::ENE => "ENE",
            Cardinal::E => "E",
            Cardinal::ESE => "ESE",
            Cardinal::SE => "SE",
            Cardinal::SSE => "SSE",
            Cardinal::S => "S",
            Cardinal::SSW => "SSW",
            Cardinal::SW => "SW",
            Cardinal::WSW => "WSW",
            Cardinal::W => "W",
            Cardinal::WNW => "WNW",
            Cardinal::NW => "NW",
            Cardinal::NNW => "NNW",
        }
    }
}

impl From<Cardinal> for &'static str {
    fn from(direction: Cardinal) -> Self {
        direction.as_str()
    }
}

impl fmt::Display for Cardinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
