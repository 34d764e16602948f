//! HTTP client for the api.weather.gov feeds
//!
//! The gridpoint lookup is addressed by coordinates. Observation and hourly
//! forecast documents are fetched from the follow-up URLs the gridpoint
//! payload names. Transient failures are retried inside a single request by
//! the retry middleware; anything that still fails is classified into a
//! [`NoaaCurrentError`] for the scheduler.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::ApiConfig;
use crate::models::{LocationPoint, RawForecastPayload, RawGridpointPayload, RawObservationPayload};
use crate::{NoaaCurrentError, Result};

const GEO_JSON: &str = "application/geo+json";

/// The three sequential fetches of one update cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Points,
    Observations,
    Forecast,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchStage::Points => "points",
            FetchStage::Observations => "observations",
            FetchStage::Forecast => "forecast",
        };
        f.write_str(name)
    }
}

/// Anything that can produce the three raw feeds
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn gridpoint(&self, location: &LocationPoint) -> Result<RawGridpointPayload>;

    /// `url` is the gridpoint's `forecastGridData`
    async fn observations(&self, url: &str) -> Result<RawObservationPayload>;

    /// `url` is the gridpoint's `forecastHourly`
    async fn forecast(&self, url: &str) -> Result<RawForecastPayload>;
}

/// [`WeatherSource`] backed by api.weather.gov
#[derive(Debug, Clone)]
pub struct NoaaClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl NoaaClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GEO_JSON));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| NoaaCurrentError::config(format!("Failed to create HTTP client: {e}")))?;

        let mut builder = ClientBuilder::new(http);
        if config.max_retries > 0 {
            let policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
        }

        Ok(Self {
            client: builder.build(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn points_url(&self, location: &LocationPoint) -> String {
        format!("{}/points/{}", self.base_url, location.points_path())
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let started = Instant::now();

        let response = self.client.get(url).send().await.map_err(|source| {
            warn!("Request to {} failed: {}", url, source);
            NoaaCurrentError::TransportFailure {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP {} from {}", status, url);
            return Err(NoaaCurrentError::HttpFailure {
                url: url.to_string(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| NoaaCurrentError::TransportFailure {
                url: url.to_string(),
                source: reqwest_middleware::Error::Reqwest(e),
            })?;

        let parsed = serde_json::from_slice(&body).map_err(|e| {
            NoaaCurrentError::malformed(format!("Failed to parse response from {url}: {e}"))
        })?;

        debug!(
            "Fetched {} ({} bytes) in {:.3}s",
            url,
            body.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(parsed)
    }
}

#[async_trait]
impl WeatherSource for NoaaClient {
    #[instrument(skip(self), fields(lat = location.latitude, lon = location.longitude))]
    async fn gridpoint(&self, location: &LocationPoint) -> Result<RawGridpointPayload> {
        self.get_json(&self.points_url(location)).await
    }

    async fn observations(&self, url: &str) -> Result<RawObservationPayload> {
        self.get_json(url).await
    }

    async fn forecast(&self, url: &str) -> Result<RawForecastPayload> {
        self.get_json(url).await
    }
}
