//! Payload slots and the snapshot derived from them
//!
//! Three raw payloads arrive independently, either from this instance's own
//! fetch chain or pushed by a peer. A pushed payload overwrites its slot and
//! re-checks completeness right away; the fetch chain stores its stages and
//! re-checks once, after the last one. Once all three are present a
//! [`DerivedSnapshot`] is built in one step and replaces the previous one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, trace, warn};

use crate::bus::{Envelope, PeerBus, PeerEvent, PresentationChannel, PresentationEvent};
use crate::clock::Clock;
use crate::config::NoaaCurrentConfig;
use crate::models::{
    DerivedSnapshot, IndoorReadings, LocationPoint, RawForecastPayload, RawGridpointPayload,
    RawObservationPayload,
};
use crate::weather::{
    Cardinal, ClockFormat, DisplayZone, UnitSystem, classify_weather, ms_to_beaufort, round_value,
    sun, sun_display, sun_window,
};
use crate::{NoaaCurrentError, Result};

/// How many of the three slots hold data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Empty,
    Partial,
    Ready,
}

/// Everything derivation needs besides the payloads
#[derive(Debug, Clone)]
pub struct DerivationSettings {
    pub units: UnitSystem,
    pub round_temp: bool,
    pub location: LocationPoint,
    pub zone: DisplayZone,
    pub clock: ClockFormat,
}

impl DerivationSettings {
    pub fn from_config(config: &NoaaCurrentConfig) -> Result<Self> {
        Ok(Self {
            units: config.units,
            round_temp: config.display.round_temp,
            location: config.location_point()?,
            zone: config.display_zone()?,
            clock: config.clock_format(),
        })
    }

    fn temperature(&self, celsius: f64) -> String {
        round_value(self.units.from_celsius(celsius), self.round_temp)
    }
}

/// Build a snapshot from a complete payload set.
///
/// Only the temperature is mandatory; every other field is left empty when
/// its series has no value in effect at `now`.
pub fn derive_snapshot(
    gridpoint: &RawGridpointPayload,
    observation: &RawObservationPayload,
    forecast: &RawForecastPayload,
    settings: &DerivationSettings,
    now: DateTime<Utc>,
) -> Result<DerivedSnapshot> {
    let readings = observation.readings_at(now);
    let temperature_c = readings
        .temperature_c
        .ok_or_else(|| NoaaCurrentError::malformed(format!("no temperature value at {now}")))?;

    let period = forecast.period_at(now).ok_or_else(|| {
        NoaaCurrentError::malformed(format!("no forecast period covers {now}"))
    })?;

    let today = sun::local_solar_date(now, settings.location.longitude);
    let window = sun_window(&settings.location, today);

    Ok(DerivedSnapshot {
        temperature: settings.temperature(temperature_c),
        feels_like: readings
            .apparent_temperature_c
            .map(|celsius| settings.temperature(celsius)),
        humidity: readings.humidity_pct,
        wind_beaufort: readings.wind_speed_ms.map(ms_to_beaufort),
        wind_cardinal: readings.wind_direction_deg.map(Cardinal::from_degrees),
        wind_degrees: readings.wind_direction_deg,
        weather_class: classify_weather(&period.icon, &window, now),
        sun: sun_display(
            &settings.location,
            &window,
            now,
            &settings.zone,
            &settings.clock,
        ),
        location_name: gridpoint.location_name(),
        units: settings.units,
        ready: true,
        derived_at: now,
    })
}

/// Owns the payload slots, the current snapshot and the outbound channels
#[derive(Debug)]
pub struct Aggregator {
    gridpoint: Option<Arc<RawGridpointPayload>>,
    observation: Option<Arc<RawObservationPayload>>,
    forecast: Option<Arc<RawForecastPayload>>,
    snapshot: Option<DerivedSnapshot>,
    indoor: IndoorReadings,
    settings: DerivationSettings,
    notifications_only: bool,
    instance_name: String,
    clock: Arc<dyn Clock>,
    bus: PeerBus,
    presentation: PresentationChannel,
}

impl Aggregator {
    pub fn new(
        config: &NoaaCurrentConfig,
        clock: Arc<dyn Clock>,
        bus: PeerBus,
        presentation: PresentationChannel,
    ) -> Result<Self> {
        Ok(Self {
            gridpoint: None,
            observation: None,
            forecast: None,
            snapshot: None,
            indoor: IndoorReadings::default(),
            settings: DerivationSettings::from_config(config)?,
            notifications_only: config.notifications_only,
            instance_name: config.instance_name.clone(),
            clock,
            bus,
            presentation,
        })
    }

    /// Store an inbound event, then derive if the set is complete
    pub fn handle(&mut self, event: PeerEvent) {
        if self.store(event) {
            self.refresh();
        }
    }

    /// Overwrite the matching slot without deriving.
    ///
    /// Returns whether a payload slot changed; indoor readings are forwarded
    /// to the presentation layer right away.
    pub fn store(&mut self, event: PeerEvent) -> bool {
        debug!("Received {}", event.name());
        match event {
            PeerEvent::Gridpoint(payload) => self.gridpoint = Some(payload),
            PeerEvent::Observation(payload) => self.observation = Some(payload),
            PeerEvent::Forecast(payload) => self.forecast = Some(payload),
            PeerEvent::IndoorTemperature(value) => {
                self.indoor.temperature = Some(round_value(value, self.settings.round_temp));
                self.presentation
                    .emit(PresentationEvent::IndoorUpdated(self.indoor.clone()));
                return false;
            }
            PeerEvent::IndoorHumidity(value) => {
                self.indoor.humidity = Some(round_value(value, self.settings.round_temp));
                self.presentation
                    .emit(PresentationEvent::IndoorUpdated(self.indoor.clone()));
                return false;
            }
        }
        true
    }

    /// Like [`Aggregator::handle`], ignoring envelopes this instance sent
    pub fn handle_envelope(&mut self, envelope: Envelope) {
        if envelope.origin == self.instance_name {
            trace!("Skipping own {}", envelope.event.name());
            return;
        }
        self.handle(envelope.event);
    }

    fn complete_set(
        &self,
    ) -> Result<(
        Arc<RawGridpointPayload>,
        Arc<RawObservationPayload>,
        Arc<RawForecastPayload>,
    )> {
        let gridpoint = self
            .gridpoint
            .clone()
            .ok_or(NoaaCurrentError::IncompleteData { missing: "gridpoint" })?;
        let observation = self
            .observation
            .clone()
            .ok_or(NoaaCurrentError::IncompleteData {
                missing: "observation",
            })?;
        let forecast = self
            .forecast
            .clone()
            .ok_or(NoaaCurrentError::IncompleteData { missing: "forecast" })?;
        Ok((gridpoint, observation, forecast))
    }

    /// Derive from the current slots if all three are filled, then publish
    pub fn refresh(&mut self) {
        let (gridpoint, observation, forecast) = match self.complete_set() {
            Ok(set) => set,
            Err(e) => {
                debug!("Waiting for more data: {}", e);
                return;
            }
        };

        let now = self.clock.now();
        let snapshot =
            match derive_snapshot(&gridpoint, &observation, &forecast, &self.settings, now) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Keeping previous conditions: {}", e);
                    return;
                }
            };

        info!(
            "Derived conditions for {}: {} {}",
            snapshot.location_name, snapshot.temperature, snapshot.weather_class
        );
        self.snapshot = Some(snapshot.clone());
        self.presentation
            .emit(PresentationEvent::SnapshotUpdated(snapshot));

        if !self.notifications_only {
            self.bus
                .publish(&self.instance_name, PeerEvent::Gridpoint(gridpoint));
            self.bus
                .publish(&self.instance_name, PeerEvent::Observation(observation));
            self.bus
                .publish(&self.instance_name, PeerEvent::Forecast(forecast));
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&DerivedSnapshot> {
        self.snapshot.as_ref()
    }

    #[must_use]
    pub fn indoor(&self) -> &IndoorReadings {
        &self.indoor
    }

    /// A snapshot has been derived at least once
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.snapshot.is_some()
    }

    #[must_use]
    pub fn state(&self) -> AggregatorState {
        let filled = [
            self.gridpoint.is_some(),
            self.observation.is_some(),
            self.forecast.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();

        match filled {
            0 => AggregatorState::Empty,
            3 if self.snapshot.is_some() => AggregatorState::Ready,
            _ => AggregatorState::Partial,
        }
    }

    #[must_use]
    pub fn gridpoint(&self) -> Option<&RawGridpointPayload> {
        self.gridpoint.as_deref()
    }

    #[must_use]
    pub fn notifications_only(&self) -> bool {
        self.notifications_only
    }

    #[must_use]
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    #[must_use]
    pub fn location(&self) -> LocationPoint {
        self.settings.location
    }

    pub fn presentation(&self) -> &PresentationChannel {
        &self.presentation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;

    const GRIDPOINT_JSON: &str = r#"{
        "properties": {
            "gridId": "LOT",
            "forecastGridData": "https://api.weather.gov/gridpoints/LOT/76,73",
            "forecastHourly": "https://api.weather.gov/gridpoints/LOT/76,73/forecast/hourly",
            "relativeLocation": {"properties": {"city": "Chicago", "state": "IL"}}
        }
    }"#;

    const OBSERVATION_JSON: &str = r#"{
        "properties": {
            "temperature": {"uom": "wmoUnit:degC", "values": [
                {"validTime": "2024-03-01T17:00:00+00:00/PT1H", "value": 20.0},
                {"validTime": "2024-03-01T18:00:00+00:00/PT1H", "value": 10.0}
            ]},
            "relativeHumidity": {"values": [
                {"validTime": "2024-03-01T17:00:00+00:00/PT3H", "value": 55.0}
            ]},
            "apparentTemperature": {"values": [
                {"validTime": "2024-03-01T17:00:00+00:00/PT3H", "value": 8.0}
            ]},
            "windSpeed": {"uom": "wmoUnit:km_h-1", "values": [
                {"validTime": "2024-03-01T17:00:00+00:00/PT3H", "value": 20.0}
            ]},
            "windDirection": {"values": [
                {"validTime": "2024-03-01T17:00:00+00:00/PT3H", "value": 225.0}
            ]}
        }
    }"#;

    const FORECAST_JSON: &str = r#"{
        "properties": {
            "periods": [
                {"startTime": "2024-03-01T12:00:00-06:00", "endTime": "2024-03-01T13:00:00-06:00",
                 "icon": "https://api.weather.gov/icons/land/day/rain_showers,40?size=small"},
                {"startTime": "2024-03-01T13:00:00-06:00", "endTime": "2024-03-01T14:00:00-06:00",
                 "icon": "https://api.weather.gov/icons/land/day/ovc?size=small"}
            ]
        }
    }"#;

    fn noon_in_chicago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap()
    }

    fn gridpoint() -> Arc<RawGridpointPayload> {
        Arc::new(serde_json::from_str(GRIDPOINT_JSON).unwrap())
    }

    fn observation() -> Arc<RawObservationPayload> {
        Arc::new(serde_json::from_str(OBSERVATION_JSON).unwrap())
    }

    fn forecast() -> Arc<RawForecastPayload> {
        Arc::new(serde_json::from_str(FORECAST_JSON).unwrap())
    }

    fn config() -> NoaaCurrentConfig {
        let mut config = NoaaCurrentConfig::for_location(41.8781, -87.6298);
        config.display.timezone = Some("America/Chicago".to_string());
        config
    }

    fn aggregator(config: &NoaaCurrentConfig) -> (Aggregator, PeerBus, PresentationChannel) {
        let bus = PeerBus::default();
        let presentation = PresentationChannel::default();
        let clock = Arc::new(FixedClock::new(noon_in_chicago()));
        let aggregator = Aggregator::new(config, clock, bus.clone(), presentation.clone()).unwrap();
        (aggregator, bus, presentation)
    }

    #[test]
    fn test_derive_snapshot_fields() {
        let settings = DerivationSettings::from_config(&config()).unwrap();
        let snapshot = derive_snapshot(
            &gridpoint(),
            &observation(),
            &forecast(),
            &settings,
            noon_in_chicago(),
        )
        .unwrap();

        // 10 C is 50 F
        assert_eq!(snapshot.temperature, "50.0");
        assert_eq!(snapshot.feels_like.as_deref(), Some("46.4"));
        assert_eq!(snapshot.humidity, Some(55.0));
        // 20 km/h is force 4
        assert_eq!(snapshot.wind_beaufort, Some(4));
        assert_eq!(snapshot.wind_cardinal, Some(Cardinal::SW));
        assert_eq!(snapshot.weather_class, "wi-day-showers");
        assert_eq!(snapshot.location_name, "Chicago, IL");
        assert!(snapshot.ready);
        assert!(snapshot.sun.is_some());
    }

    #[test]
    fn test_metric_keeps_celsius() {
        let mut config = config();
        config.units = UnitSystem::Metric;
        config.display.round_temp = true;
        let settings = DerivationSettings::from_config(&config).unwrap();
        let snapshot = derive_snapshot(
            &gridpoint(),
            &observation(),
            &forecast(),
            &settings,
            noon_in_chicago(),
        )
        .unwrap();
        assert_eq!(snapshot.temperature, "10");
        assert_eq!(snapshot.units, UnitSystem::Metric);
    }

    #[test]
    fn test_missing_forecast_period_is_malformed() {
        let settings = DerivationSettings::from_config(&config()).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 2, 18, 30, 0).unwrap();
        let err = derive_snapshot(&gridpoint(), &observation(), &forecast(), &settings, later)
            .unwrap_err();
        assert!(matches!(err, NoaaCurrentError::MalformedPayload { .. }));
    }

    #[test]
    fn test_partial_slots_never_derive() {
        let (mut aggregator, _bus, _presentation) = aggregator(&config());
        assert_eq!(aggregator.state(), AggregatorState::Empty);

        aggregator.handle(PeerEvent::Gridpoint(gridpoint()));
        aggregator.handle(PeerEvent::Forecast(forecast()));
        assert_eq!(aggregator.state(), AggregatorState::Partial);
        assert!(aggregator.snapshot().is_none());

        aggregator.handle(PeerEvent::Observation(observation()));
        assert_eq!(aggregator.state(), AggregatorState::Ready);
        assert!(aggregator.is_ready());
    }

    #[test]
    fn test_complete_set_republishes_to_peers() {
        let (mut aggregator, bus, presentation) = aggregator(&config());
        let mut peers = bus.subscribe();
        let mut screen = presentation.subscribe();

        aggregator.handle(PeerEvent::Gridpoint(gridpoint()));
        aggregator.handle(PeerEvent::Observation(observation()));
        aggregator.handle(PeerEvent::Forecast(forecast()));

        assert!(matches!(
            screen.try_recv().unwrap(),
            PresentationEvent::SnapshotUpdated(_)
        ));
        let names: Vec<_> = std::iter::from_fn(|| peers.try_recv().ok())
            .map(|envelope| {
                assert_eq!(envelope.origin, "noaacurrent");
                envelope.event.name()
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "NOAAWEATHER_GRIDPOINT_DATA",
                "NOAAWEATHER_CURRENT_DATA",
                "NOAAWEATHER_HOURLY_DATA"
            ]
        );
    }

    #[test]
    fn test_store_defers_derivation_until_refresh() {
        let (mut aggregator, bus, presentation) = aggregator(&config());
        let mut peers = bus.subscribe();
        let mut screen = presentation.subscribe();

        assert!(aggregator.store(PeerEvent::Gridpoint(gridpoint())));
        assert!(aggregator.store(PeerEvent::Observation(observation())));
        assert!(aggregator.store(PeerEvent::Forecast(forecast())));
        assert!(aggregator.snapshot().is_none());
        assert!(screen.try_recv().is_err());
        assert!(peers.try_recv().is_err());

        aggregator.refresh();
        assert!(aggregator.is_ready());
        assert!(matches!(
            screen.try_recv().unwrap(),
            PresentationEvent::SnapshotUpdated(_)
        ));
        assert_eq!(std::iter::from_fn(|| peers.try_recv().ok()).count(), 3);
    }

    #[test]
    fn test_own_envelopes_are_ignored() {
        let (mut aggregator, _bus, _presentation) = aggregator(&config());
        aggregator.handle_envelope(Envelope {
            origin: "noaacurrent".to_string(),
            event: PeerEvent::Gridpoint(gridpoint()),
        });
        assert_eq!(aggregator.state(), AggregatorState::Empty);

        aggregator.handle_envelope(Envelope {
            origin: "den".to_string(),
            event: PeerEvent::Gridpoint(gridpoint()),
        });
        assert_eq!(aggregator.state(), AggregatorState::Partial);
    }

    #[test]
    fn test_malformed_set_keeps_previous_snapshot() {
        let (mut aggregator, _bus, _presentation) = aggregator(&config());
        aggregator.handle(PeerEvent::Gridpoint(gridpoint()));
        aggregator.handle(PeerEvent::Observation(observation()));
        aggregator.handle(PeerEvent::Forecast(forecast()));
        let before = aggregator.snapshot().cloned();

        let empty: RawForecastPayload =
            serde_json::from_str(r#"{"properties": {"periods": []}}"#).unwrap();
        aggregator.handle(PeerEvent::Forecast(Arc::new(empty)));

        assert_eq!(aggregator.snapshot().cloned(), before);
    }

    #[test]
    fn test_indoor_readings_are_rounded_and_forwarded() {
        let mut config = config();
        config.display.round_temp = true;
        let (mut aggregator, _bus, presentation) = aggregator(&config);
        let mut screen = presentation.subscribe();

        aggregator.handle(PeerEvent::IndoorTemperature(21.6));

        assert_eq!(aggregator.indoor().temperature.as_deref(), Some("22"));
        assert_eq!(aggregator.state(), AggregatorState::Empty);
        match screen.try_recv().unwrap() {
            PresentationEvent::IndoorUpdated(readings) => {
                assert_eq!(readings.temperature.as_deref(), Some("22"));
                assert_eq!(readings.humidity, None);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
