//! Condition code lookup shared by every provider.
//!
//! WMO codes (0..=99, columnar provider) and OpenWeather condition ids
//! (200..=804, discrete-sample provider) occupy disjoint ranges, so a single
//! table covers both.

/// Code used when a provider omitted the condition for a sample.
pub const UNKNOWN_CONDITION_CODE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub emoji: &'static str,
    pub description: &'static str,
}

pub const FALLBACK_CONDITION: Condition = Condition { emoji: "☁️", description: "Cloudy" };

/// `(low, high, emoji, description)`, inclusive on both ends. First match wins.
pub const CONDITION_TABLE: &[(i32, i32, &str, &str)] = &[
    // WMO weather interpretation codes
    (0, 0, "☀️", "Clear sky"),
    (1, 1, "🌤️", "Mainly clear"),
    (2, 2, "⛅", "Partly cloudy"),
    (3, 3, "☁️", "Overcast"),
    (45, 48, "🌫️", "Fog"),
    (51, 55, "🌦️", "Drizzle"),
    (56, 57, "🌧️", "Freezing drizzle"),
    (61, 61, "🌧️", "Slight rain"),
    (63, 63, "🌧️", "Moderate rain"),
    (65, 65, "🌧️", "Heavy rain"),
    (66, 67, "🌧️", "Freezing rain"),
    (71, 75, "🌨️", "Snowfall"),
    (77, 77, "🌨️", "Snow grains"),
    (80, 82, "🌦️", "Rain showers"),
    (85, 86, "🌨️", "Snow showers"),
    (95, 95, "⛈️", "Thunderstorm"),
    (96, 99, "⛈️", "Thunderstorm with hail"),
    // OpenWeather condition ids
    (200, 232, "⛈️", "Thunderstorm"),
    (300, 321, "🌦️", "Drizzle"),
    (500, 504, "🌧️", "Rain"),
    (511, 511, "🌧️", "Freezing rain"),
    (520, 531, "🌦️", "Rain showers"),
    (600, 622, "🌨️", "Snow"),
    (701, 781, "🌫️", "Mist"),
    (800, 800, "☀️", "Clear sky"),
    (801, 801, "🌤️", "Few clouds"),
    (802, 802, "⛅", "Scattered clouds"),
    (803, 804, "☁️", "Overcast"),
];

/// Total over all integers: unmapped codes resolve to [`FALLBACK_CONDITION`].
#[must_use]
pub fn describe_condition(code: i32) -> Condition {
    CONDITION_TABLE
        .iter()
        .find(|(low, high, _, _)| (*low..=*high).contains(&code))
        .map(|&(_, _, emoji, description)| Condition { emoji, description })
        .unwrap_or(FALLBACK_CONDITION)
}
