//! Sunrise/sunset window and its display string

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use sunrise::{Coordinates, SolarDay, SolarEvent};

use crate::models::LocationPoint;

/// Sunrise and sunset for one solar day; `None` when the event does not occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunWindow {
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

impl SunWindow {
    /// Strictly between sunrise and sunset
    #[must_use]
    pub fn is_daylight(&self, now: DateTime<Utc>) -> bool {
        matches!((self.sunrise, self.sunset), (Some(rise), Some(set)) if rise < now && now < set)
    }
}

pub fn sun_window(location: &LocationPoint, date: NaiveDate) -> SunWindow {
    let Some(coordinates) = Coordinates::new(location.latitude, location.longitude) else {
        return SunWindow {
            sunrise: None,
            sunset: None,
        };
    };

    let solar_day = SolarDay::new(coordinates, date);
    SunWindow {
        sunrise: solar_day.event_time(SolarEvent::Sunrise),
        sunset: solar_day.event_time(SolarEvent::Sunset),
    }
}

/// Calendar date at the location, approximated from its longitude.
///
/// Using the UTC date would move evenings in the western hemisphere onto
/// the next day's sun times.
#[must_use]
pub fn local_solar_date(now: DateTime<Utc>, longitude: f64) -> NaiveDate {
    // 240 s of solar time per degree of longitude
    let offset = Duration::seconds((longitude * 240.0).round() as i64);
    (now + offset).date_naive()
}

/// Which sun event the display shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SunIcon {
    #[serde(rename = "wi-sunrise")]
    Sunrise,
    #[serde(rename = "wi-sunset")]
    Sunset,
}

impl SunIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            SunIcon::Sunrise => "wi-sunrise",
            SunIcon::Sunset => "wi-sunset",
        }
    }
}

/// Next sun event, rendered for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SunDisplay {
    pub time: String,
    pub icon: SunIcon,
    #[serde(skip)]
    pub at: DateTime<Utc>,
}

/// 12/24-hour clock rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFormat {
    /// 12 or 24
    pub hour_cycle: u8,
    pub show_period: bool,
    pub show_period_upper: bool,
}

impl Default for ClockFormat {
    fn default() -> Self {
        Self {
            hour_cycle: 24,
            show_period: true,
            show_period_upper: false,
        }
    }
}

impl ClockFormat {
    /// `HH:mm`, or `h:mm` with an optional am/pm suffix
    #[must_use]
    pub fn format<T: Timelike>(&self, time: &T) -> String {
        let minute = time.minute();
        if self.hour_cycle == 24 {
            return format!("{:02}:{minute:02}", time.hour());
        }

        let (is_pm, hour) = time.hour12();
        let mut rendered = format!("{hour}:{minute:02}");
        if self.show_period {
            let period = match (is_pm, self.show_period_upper) {
                (false, false) => " am",
                (true, false) => " pm",
                (false, true) => " AM",
                (true, true) => " PM",
            };
            rendered.push_str(period);
        }
        rendered
    }
}

/// Zone sun times are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Local,
    Named(Tz),
}

impl DisplayZone {
    #[must_use]
    pub fn format(&self, instant: DateTime<Utc>, clock: &ClockFormat) -> String {
        match self {
            DisplayZone::Local => clock.format(&instant.with_timezone(&chrono::Local)),
            DisplayZone::Named(tz) => clock.format(&tz.from_utc_datetime(&instant.naive_utc())),
        }
    }
}

/// Sunset while it is light out, otherwise the upcoming sunrise.
///
/// Once today's sunrise has passed, the upcoming one belongs to the next
/// solar day, whether or not the sun sets today.
pub fn sun_display(
    location: &LocationPoint,
    today: &SunWindow,
    now: DateTime<Utc>,
    zone: &DisplayZone,
    clock: &ClockFormat,
) -> Option<SunDisplay> {
    let (icon, at) = if today.is_daylight(now) {
        (SunIcon::Sunset, today.sunset?)
    } else {
        let sunrise = match today.sunrise {
            Some(sunrise) if now < sunrise => sunrise,
            _ => {
                let date = local_solar_date(now, location.longitude) + Duration::days(1);
                sun_window(location, date).sunrise?
            }
        };
        (SunIcon::Sunrise, sunrise)
    };

    Some(SunDisplay {
        time: zone.format(at, clock),
        icon,
        at,
    })
}
