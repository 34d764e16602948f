//! `noaa-current` - current conditions from the api.weather.gov feeds
//!
//! Fetches the gridpoint, observation and hourly forecast documents for one
//! location, fuses them into a ready-to-present snapshot and shares the raw
//! payloads with peer instances over a broadcast bus.

pub mod aggregator;
pub mod api;
pub mod bus;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod telemetry;
pub mod weather;

// Re-export core types for public API
pub use aggregator::{Aggregator, AggregatorState, DerivationSettings, derive_snapshot};
pub use api::{FetchStage, NoaaClient, WeatherSource};
pub use bus::{Envelope, PeerBus, PeerEvent, PresentationChannel, PresentationEvent};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::NoaaCurrentConfig;
pub use error::NoaaCurrentError;
pub use models::{
    DerivedSnapshot, IndoorReadings, LocationPoint, RawForecastPayload, RawGridpointPayload,
    RawObservationPayload,
};
pub use scheduler::{CycleOutcome, Runtime, Schedule};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, NoaaCurrentError>;
