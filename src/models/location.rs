//! Location model for the single point an instance tracks

use serde::{Deserialize, Serialize};

use crate::NoaaCurrentError;

/// Location coordinates, fixed for the lifetime of an instance
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct LocationPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl LocationPoint {
    /// Create a validated location
    pub fn new(latitude: f64, longitude: f64) -> crate::Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(NoaaCurrentError::config(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(NoaaCurrentError::config(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Round coordinates to `precision` decimals
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// `{lat},{lon}` segment for the `/points` endpoint.
    ///
    /// api.weather.gov redirects requests carrying more than four decimals,
    /// so coordinates are rounded first.
    #[must_use]
    pub fn points_path(&self) -> String {
        let (lat, lon) = self.rounded_coordinates(4);
        format!("{lat},{lon}")
    }
}
