//! Weather icon classification
//!
//! Maps an api.weather.gov icon URL onto a weather-icons class name such as
//! `wi-day-showers`, taking day or night from the sunrise/sunset window.

use chrono::{DateTime, Utc};

use super::sun::SunWindow;

const DAY: &str = "wi-day";
const NIGHT: &str = "wi-night";

/// Condition suffix for an icon code; values starting with `wi-` are complete
fn condition_for(code: &str) -> Option<&'static str> {
    let condition = match code {
        "skc" | "few" => "sunny",
        "sct" | "bkn" => "sunny-overcast",
        "ovc" => "cloudy",
        "wind_skc" | "wind_few" => "windy",
        "wind_sct" | "wind_bkn" | "wind_ovc" => "cloudy-windy",
        "snow" => "snow",
        "rain_snow" | "fzra" | "rain_fzra" | "snow_fzra" => "rain-mix",
        "rain_sleet" | "snow_sleet" | "sleet" => "sleet",
        "rain" => "rain",
        "rain_showers" | "rain_showers_hi" => "showers",
        "tsra" | "tsra_sct" | "tsra_hi" => "thunderstorm",
        "tornado" => "wi-tornado",
        "hurricane" => "wi-hurricane-warning",
        "tropical_storm" => "wi-hurricane",
        "dust" => "wi-dust",
        "smoke" => "wi-smoke",
        "haze" => "wi-haze",
        "hot" => "wi-hot",
        "cold" => "wi-cold",
        "blizzard" => "snow-wind",
        "fog" => "fog",
        _ => return None,
    };
    Some(condition)
}

/// Night variants that have a dedicated glyph
fn correction_for(class: &str) -> Option<&'static str> {
    match class {
        "wi-night-sunny" => Some("wi-night-clear"),
        "wi-night-sunny-overcast" => Some("wi-night-partly-cloudy"),
        _ => None,
    }
}

/// Icon code from an icon URL.
///
/// `https://api.weather.gov/icons/land/day/tsra,40/rain_showers,20?size=small`
/// yields `rain_showers`.
#[must_use]
pub fn icon_code(icon: &str) -> &str {
    let segment = icon.rsplit('/').next().unwrap_or(icon);
    let segment = segment.split('?').next().unwrap_or(segment);
    segment.split(',').next().unwrap_or(segment)
}

/// `wi-day` when no sunrise is known or `now` is inside `[sunrise, sunset)`
#[must_use]
pub fn day_night_prefix(window: &SunWindow, now: DateTime<Utc>) -> &'static str {
    match (window.sunrise, window.sunset) {
        (None, _) => DAY,
        (Some(sunrise), Some(sunset)) if now >= sunrise && now < sunset => DAY,
        _ => NIGHT,
    }
}

/// Weather-icons class for an icon URL at `now`
#[must_use]
pub fn classify_weather(icon: &str, window: &SunWindow, now: DateTime<Utc>) -> String {
    let prefix = day_night_prefix(window, now);

    match condition_for(icon_code(icon)) {
        None => prefix.to_string(),
        Some(qualified) if qualified.starts_with("wi-") => qualified.to_string(),
        Some(condition) => {
            let class = format!("{prefix}-{condition}");
            correction_for(&class).map_or(class, str::to_string)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> SunWindow {
        SunWindow {
            sunrise: Some(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()),
            sunset: Some(Utc.with_ymd_and_hms(2024, 6, 2, 1, 0, 0).unwrap()),
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 17, 0, 0).unwrap()
    }

    fn midnight() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 2, 5, 0, 0).unwrap()
    }

    #[test]
    fn test_icon_code_extraction() {
        assert_eq!(
            icon_code("https://api.weather.gov/icons/land/day/rain_showers?size=medium"),
            "rain_showers"
        );
        assert_eq!(
            icon_code("https://api.weather.gov/icons/land/night/tsra,40/rain,20?size=small"),
            "rain"
        );
        assert_eq!(icon_code("https://api.weather.gov/icons/land/day/bkn,30"), "bkn");
        assert_eq!(icon_code("skc"), "skc");
    }

    #[test]
    fn test_daytime_showers() {
        let class = classify_weather(".../rain_showers?size=medium", &window(), noon());
        assert_eq!(class, "wi-day-showers");
    }

    #[test]
    fn test_night_corrections() {
        assert_eq!(classify_weather("skc", &window(), midnight()), "wi-night-clear");
        assert_eq!(
            classify_weather("bkn", &window(), midnight()),
            "wi-night-partly-cloudy"
        );
        assert_eq!(classify_weather("skc", &window(), noon()), "wi-day-sunny");
        assert_eq!(classify_weather("ovc", &window(), midnight()), "wi-night-cloudy");
    }

    #[test]
    fn test_prequalified_codes_skip_prefix() {
        assert_eq!(classify_weather("tornado", &window(), midnight()), "wi-tornado");
        assert_eq!(
            classify_weather(".../hurricane?size=small", &window(), noon()),
            "wi-hurricane-warning"
        );
    }

    #[test]
    fn test_unknown_code_returns_prefix() {
        assert_eq!(classify_weather("volcano", &window(), noon()), "wi-day");
        assert_eq!(classify_weather("volcano", &window(), midnight()), "wi-night");
    }

    #[test]
    fn test_window_boundaries() {
        let w = window();
        assert_eq!(day_night_prefix(&w, w.sunrise.unwrap()), "wi-day");
        assert_eq!(day_night_prefix(&w, w.sunset.unwrap()), "wi-night");
    }

    #[test]
    fn test_missing_sunrise_counts_as_day() {
        let polar = SunWindow {
            sunrise: None,
            sunset: None,
        };
        assert_eq!(classify_weather("skc", &polar, midnight()), "wi-day-sunny");
    }
}
