//! Configuration management for noaa-current
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::NoaaCurrentError;
use crate::models::LocationPoint;
use crate::weather::{ClockFormat, DisplayZone, UnitSystem};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoaaCurrentConfig {
    /// Tracked point
    #[serde(default)]
    pub location: LocationConfig,
    /// Unit system for temperatures
    #[serde(default)]
    pub units: UnitSystem,
    /// Display formatting options
    #[serde(default)]
    pub display: DisplayConfig,
    /// Polling and retry timing
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Upstream API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Only react to payloads pushed by peers, never fetch
    #[serde(default)]
    pub notifications_only: bool,
    /// Origin tag on peer bus envelopes
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// 12 or 24
    #[serde(default = "default_time_format")]
    pub time_format: u8,
    #[serde(default = "default_true")]
    pub show_period: bool,
    #[serde(default)]
    pub show_period_upper: bool,
    /// Round temperatures to whole degrees
    #[serde(default)]
    pub round_temp: bool,
    /// IANA zone for sun times; host local time when absent
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub initial_load_delay_ms: u64,
    /// After the first snapshot, wait the full interval after a failure
    #[serde(default)]
    pub relaxed_retry_after_load: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Transient retries inside a single request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_instance_name() -> String {
    "noaacurrent".to_string()
}

fn default_time_format() -> u8 {
    24
}

fn default_true() -> bool {
    true
}

fn default_update_interval() -> u64 {
    10 * 60 * 1000
}

fn default_retry_delay() -> u64 {
    2500
}

fn default_base_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_user_agent() -> String {
    format!("noaa-current/{}", crate::VERSION)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
            show_period: true,
            show_period_upper: false,
            round_temp: false,
            timezone: None,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval(),
            retry_delay_ms: default_retry_delay(),
            initial_load_delay_ms: 0,
            relaxed_retry_after_load: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for NoaaCurrentConfig {
    fn default() -> Self {
        Self {
            location: LocationConfig::default(),
            units: UnitSystem::default(),
            display: DisplayConfig::default(),
            schedule: ScheduleConfig::default(),
            api: ApiConfig::default(),
            notifications_only: false,
            instance_name: default_instance_name(),
            logging: LoggingConfig::default(),
        }
    }
}

impl NoaaCurrentConfig {
    /// Config for a point with every other setting at its default
    #[must_use]
    pub fn for_location(lat: f64, lon: f64) -> Self {
        Self {
            location: LocationConfig {
                lat: Some(lat),
                lon: Some(lon),
            },
            ..Self::default()
        }
    }

    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // NOAACURRENT_SCHEDULE__RETRY_DELAY_MS=5000
        builder = builder.add_source(
            Environment::with_prefix("NOAACURRENT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: NoaaCurrentConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("noaa-current").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.api.base_url.is_empty() {
            self.api.base_url = default_base_url();
        }
        if self.api.timeout_seconds == 0 {
            self.api.timeout_seconds = default_timeout();
        }
        if self.api.user_agent.is_empty() {
            self.api.user_agent = default_user_agent();
        }
        if self.schedule.update_interval_ms == 0 {
            self.schedule.update_interval_ms = default_update_interval();
        }
        if self.instance_name.is_empty() {
            self.instance_name = default_instance_name();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        self.api.base_url = self.api.base_url.trim_end_matches('/').to_string();
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.location_point()?;
        self.display_zone()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// The tracked point, validated
    pub fn location_point(&self) -> crate::Result<LocationPoint> {
        match (self.location.lat, self.location.lon) {
            (Some(lat), Some(lon)) => LocationPoint::new(lat, lon),
            _ => Err(NoaaCurrentError::config(
                "location.lat and location.lon are required",
            )),
        }
    }

    /// Zone sun times are rendered in
    pub fn display_zone(&self) -> crate::Result<DisplayZone> {
        match &self.display.timezone {
            None => Ok(DisplayZone::Local),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map(DisplayZone::Named)
                .map_err(|_| NoaaCurrentError::config(format!("Unknown time zone '{name}'"))),
        }
    }

    #[must_use]
    pub fn clock_format(&self) -> ClockFormat {
        ClockFormat {
            hour_cycle: self.display.time_format,
            show_period: self.display.show_period,
            show_period_upper: self.display.show_period_upper,
        }
    }

    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.schedule.update_interval_ms)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.schedule.retry_delay_ms)
    }

    #[must_use]
    pub fn initial_load_delay(&self) -> Duration {
        Duration::from_millis(self.schedule.initial_load_delay_ms)
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.display.time_format != 12 && self.display.time_format != 24 {
            return Err(NoaaCurrentError::config(format!(
                "display.time_format must be 12 or 24, got: {}",
                self.display.time_format
            ))
            .into());
        }

        if self.schedule.update_interval_ms < 1000 {
            return Err(NoaaCurrentError::config(
                "schedule.update_interval_ms must be at least 1000",
            )
            .into());
        }

        if self.schedule.retry_delay_ms > self.schedule.update_interval_ms {
            return Err(NoaaCurrentError::config(
                "schedule.retry_delay_ms cannot exceed schedule.update_interval_ms",
            )
            .into());
        }

        if self.api.timeout_seconds == 0 || self.api.timeout_seconds > 300 {
            return Err(
                NoaaCurrentError::config("API timeout must be between 1 and 300 seconds").into(),
            );
        }

        if self.api.max_retries > 10 {
            return Err(NoaaCurrentError::config("API max retries cannot exceed 10").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(NoaaCurrentError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(NoaaCurrentError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(NoaaCurrentError::config(
                "API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}
