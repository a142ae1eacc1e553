use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

/// A resolved place. `timezone_offset_seconds` is the place's offset from UTC,
/// which decides where its local day boundaries fall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone_offset_seconds: i32,
}

impl Location {
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// One provider-reported point in time. `None` means the provider did not
/// report that metric for this instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp_utc: DateTime<Utc>,
    pub temperature: f64,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub condition_code: i32,
    pub apparent_temperature: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_hpa: Option<f64>,
}

impl WeatherSample {
    /// Sample with only the required fields set.
    pub fn new(timestamp_utc: DateTime<Utc>, temperature: f64, condition_code: i32) -> Self {
        Self {
            timestamp_utc,
            temperature,
            temperature_min: None,
            temperature_max: None,
            condition_code,
            apparent_temperature: None,
            humidity_pct: None,
            pressure_hpa: None,
        }
    }
}

/// All samples of one local calendar day reduced to a single row.
///
/// Invariant: `min_temperature <= max_temperature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub local_date: NaiveDate,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub representative_condition_code: i32,
    pub representative_description: String,
}

/// Conditions at the time of the search, shown above the day list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub observed_at: DateTime<Utc>,
    pub temperature: f64,
    pub apparent_temperature: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub condition_code: i32,
    pub description: String,
}

/// Everything one search produces. A new search replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub provider: ProviderId,
    pub location: Location,
    pub current: CurrentConditions,
    pub days: Vec<DaySummary>,
}
