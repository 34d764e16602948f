//! Pure derivation helpers: sampling, unit conversion, sun times and icon
//! classification.

pub mod classify;
pub mod sampler;
pub mod sun;
pub mod units;

pub use classify::classify_weather;
pub use sampler::{sample_containing, sample_latest_effective};
pub use sun::{ClockFormat, DisplayZone, SunDisplay, SunIcon, SunWindow, sun_display, sun_window};
pub use units::{Cardinal, UnitSystem, celsius_to_fahrenheit, ms_to_beaufort, round_value};
