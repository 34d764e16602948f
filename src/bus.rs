//! Typed pub/sub surface between peer instances and the presentation layer
//!
//! Peers exchange raw payloads on a broadcast channel. Every message is
//! wrapped in an [`Envelope`] naming its origin so an instance can skip its
//! own publications. The presentation layer gets a separate, one-way stream
//! of [`PresentationEvent`]s.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::models::{
    DerivedSnapshot, IndoorReadings, RawForecastPayload, RawGridpointPayload,
    RawObservationPayload,
};

const DEFAULT_CAPACITY: usize = 64;

/// Message exchanged between instances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "notification", content = "payload")]
pub enum PeerEvent {
    #[serde(rename = "NOAAWEATHER_GRIDPOINT_DATA")]
    Gridpoint(Arc<RawGridpointPayload>),
    #[serde(rename = "NOAAWEATHER_CURRENT_DATA")]
    Observation(Arc<RawObservationPayload>),
    #[serde(rename = "NOAAWEATHER_HOURLY_DATA")]
    Forecast(Arc<RawForecastPayload>),
    #[serde(rename = "INDOOR_TEMPERATURE")]
    IndoorTemperature(f64),
    #[serde(rename = "INDOOR_HUMIDITY")]
    IndoorHumidity(f64),
}

impl PeerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PeerEvent::Gridpoint(_) => "NOAAWEATHER_GRIDPOINT_DATA",
            PeerEvent::Observation(_) => "NOAAWEATHER_CURRENT_DATA",
            PeerEvent::Forecast(_) => "NOAAWEATHER_HOURLY_DATA",
            PeerEvent::IndoorTemperature(_) => "INDOOR_TEMPERATURE",
            PeerEvent::IndoorHumidity(_) => "INDOOR_HUMIDITY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// `instance_name` of the sender
    pub origin: String,
    pub event: PeerEvent,
}

/// Signals consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum PresentationEvent {
    NotYetLoaded,
    SnapshotUpdated(DerivedSnapshot),
    IndoorUpdated(IndoorReadings),
}

/// Shared peer channel; clones publish into and subscribe from the same bus
#[derive(Debug, Clone)]
pub struct PeerBus {
    sender: broadcast::Sender<Envelope>,
}

impl Default for PeerBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PeerBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, origin: &str, event: PeerEvent) {
        let name = event.name();
        let envelope = Envelope {
            origin: origin.to_string(),
            event,
        };
        if self.sender.send(envelope).is_err() {
            trace!("No peers listening for {}", name);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }
}

/// Outbound stream to the presentation layer
#[derive(Debug, Clone)]
pub struct PresentationChannel {
    sender: broadcast::Sender<PresentationEvent>,
}

impl Default for PresentationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PresentationChannel {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn emit(&self, event: PresentationEvent) {
        if self.sender.send(event).is_err() {
            trace!("No presentation consumer attached");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PresentationEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_uses_notification_names() {
        let envelope = Envelope {
            origin: "hallway".to_string(),
            event: PeerEvent::IndoorTemperature(21.5),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["origin"], "hallway");
        assert_eq!(json["event"]["notification"], "INDOOR_TEMPERATURE");
        assert_eq!(json["event"]["payload"], 21.5);

        let parsed: Envelope = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[tokio::test]
    async fn test_bus_delivers_to_every_subscriber() {
        let bus = PeerBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish("kitchen", PeerEvent::IndoorHumidity(40.0));

        assert_eq!(first.recv().await.unwrap().origin, "kitchen");
        assert_eq!(
            second.recv().await.unwrap().event,
            PeerEvent::IndoorHumidity(40.0)
        );
    }

    #[test]
    fn test_publish_without_listeners_is_silent() {
        let bus = PeerBus::new(4);
        bus.publish("lonely", PeerEvent::IndoorHumidity(40.0));
        PresentationChannel::new(4).emit(PresentationEvent::NotYetLoaded);
    }
}
