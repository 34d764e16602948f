//! Data models for noaa-current
//!
//! - Location: the single tracked point
//! - Payload: raw api.weather.gov documents, republished to peers with unmodelled fields intact
//! - Snapshot: the derived current conditions

pub mod location;
pub mod payload;
pub mod snapshot;

// Re-export all public types for convenient access
pub use location::LocationPoint;
pub use payload::{
    CurrentReadings, Extra, ForecastPeriod, Measurement, QuantitativeSeries, RawForecastPayload,
    RawGridpointPayload, RawObservationPayload, ValidTime,
};
pub use snapshot::{DerivedSnapshot, IndoorReadings};
