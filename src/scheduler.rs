//! Update cycle driver
//!
//! A [`Runtime`] runs the three-stage fetch chain on a timer and feeds its
//! results, and every payload pushed by a peer, into one [`Aggregator`].
//! How long to wait before the next cycle is decided by [`Schedule`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{error, info, instrument, warn};

use crate::NoaaCurrentError;
use crate::aggregator::Aggregator;
use crate::api::{FetchStage, WeatherSource};
use crate::bus::{Envelope, PeerBus, PeerEvent, PresentationEvent};
use crate::config::NoaaCurrentConfig;

/// Result of one fetch chain
#[derive(Debug)]
pub enum CycleOutcome {
    Completed,
    Failed {
        stage: FetchStage,
        error: NoaaCurrentError,
    },
}

impl CycleOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, CycleOutcome::Failed { .. })
    }
}

/// Timer policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub update_interval: Duration,
    pub retry_delay: Duration,
    pub initial_delay: Duration,
    /// Once loaded, a failure waits the full interval instead of the retry delay
    pub relaxed_retry_after_load: bool,
}

impl Schedule {
    #[must_use]
    pub fn from_config(config: &NoaaCurrentConfig) -> Self {
        Self {
            update_interval: config.update_interval(),
            retry_delay: config.retry_delay(),
            initial_delay: config.initial_load_delay(),
            relaxed_retry_after_load: config.schedule.relaxed_retry_after_load,
        }
    }

    /// Delay before the first cycle
    #[must_use]
    pub fn initial(&self) -> Duration {
        self.initial_delay
    }

    /// Delay before the cycle after `outcome`; `loaded` is whether a snapshot exists
    #[must_use]
    pub fn next_delay(&self, outcome: &CycleOutcome, loaded: bool) -> Duration {
        match outcome {
            CycleOutcome::Completed => self.update_interval,
            CycleOutcome::Failed { .. } if loaded && self.relaxed_retry_after_load => {
                self.update_interval
            }
            CycleOutcome::Failed { .. } => self.retry_delay,
        }
    }
}

/// Owns the aggregator and drives it from the timer and the peer bus
pub struct Runtime<S> {
    source: S,
    aggregator: Aggregator,
    schedule: Schedule,
    inbound: broadcast::Receiver<Envelope>,
    next_delay: Option<Duration>,
}

impl<S: WeatherSource> Runtime<S> {
    pub fn new(source: S, aggregator: Aggregator, schedule: Schedule, bus: &PeerBus) -> Self {
        Self {
            source,
            aggregator,
            schedule,
            inbound: bus.subscribe(),
            next_delay: None,
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Delay armed by the most recent cycle
    #[must_use]
    pub fn next_delay(&self) -> Option<Duration> {
        self.next_delay
    }

    /// Run the chain once.
    ///
    /// Each stage is stored as it lands, but derivation and republishing
    /// happen only after the last stage succeeds. A broken chain leaves the
    /// shown snapshot alone.
    #[instrument(level = "debug", skip(self))]
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let location = self.aggregator.location();

        let gridpoint = match self.source.gridpoint(&location).await {
            Ok(payload) => Arc::new(payload),
            Err(error) => {
                return CycleOutcome::Failed {
                    stage: FetchStage::Points,
                    error,
                };
            }
        };
        let observations_url = gridpoint.properties.forecast_grid_data.clone();
        let forecast_url = gridpoint.properties.forecast_hourly.clone();
        self.aggregator.store(PeerEvent::Gridpoint(gridpoint));

        match self.source.observations(&observations_url).await {
            Ok(payload) => {
                self.aggregator
                    .store(PeerEvent::Observation(Arc::new(payload)));
            }
            Err(error) => {
                return CycleOutcome::Failed {
                    stage: FetchStage::Observations,
                    error,
                };
            }
        }

        match self.source.forecast(&forecast_url).await {
            Ok(payload) => {
                self.aggregator.store(PeerEvent::Forecast(Arc::new(payload)));
            }
            Err(error) => {
                return CycleOutcome::Failed {
                    stage: FetchStage::Forecast,
                    error,
                };
            }
        }

        self.aggregator.refresh();
        CycleOutcome::Completed
    }

    /// One cycle plus rescheduling; returns the delay armed for the next one
    pub async fn update(&mut self) -> Duration {
        let outcome = self.run_cycle().await;
        if let CycleOutcome::Failed { stage, error } = &outcome {
            warn!("Fetching {} failed: {}", stage, error);
        }

        let delay = self
            .schedule
            .next_delay(&outcome, self.aggregator.is_ready());
        self.next_delay = Some(delay);
        delay
    }

    /// Serve until `shutdown` fires or its sender is dropped
    pub async fn run(&mut self, mut shutdown: watch::Receiver<()>) {
        self.aggregator
            .presentation()
            .emit(PresentationEvent::NotYetLoaded);

        let fetching = !self.aggregator.notifications_only();
        if !fetching {
            info!("Notification-only mode; waiting for payloads from peers");
        }

        let mut deadline = Instant::now() + self.schedule.initial();
        let mut bus_open = true;

        loop {
            tokio::select! {
                () = sleep_until(deadline), if fetching => {
                    let delay = self.update().await;
                    deadline = Instant::now() + delay;
                }
                received = self.inbound.recv(), if bus_open => match received {
                    Ok(envelope) => self.aggregator.handle_envelope(envelope),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Peer bus lagged, skipped {} messages", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("Peer bus closed");
                        bus_open = false;
                    }
                },
                _ = shutdown.changed() => {
                    info!("Shutting down");
                    break;
                }
            }
        }
    }
}
