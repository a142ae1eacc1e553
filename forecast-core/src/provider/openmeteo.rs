use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    condition::{UNKNOWN_CONDITION_CODE, describe_condition},
    error::FetchError,
    extract::PayloadShape,
    model::{CurrentConditions, Location},
    provider::{LANGUAGE, decode, get_json, http_client},
};

use super::{ProviderId, RawForecast, WeatherProvider};

const FORECAST_URL: &str = "https://api.open-meteo.com";
const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,pressure_msl";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min";
const FORECAST_DAYS: &str = "7";

/// Open-Meteo: daily forecast as parallel columns. Needs no API key.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    forecast_url: String,
    geocoding_url: String,
    http: Client,
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self {
            forecast_url: FORECAST_URL.to_string(),
            geocoding_url: GEOCODING_URL.to_string(),
            http: http_client(),
        }
    }

    pub fn with_forecast_url(mut self, base_url: impl Into<String>) -> Self {
        self.forecast_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_geocoding_url(mut self, base_url: impl Into<String>) -> Self {
        self.geocoding_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastHeader {
    #[serde(default)]
    utc_offset_seconds: i32,
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: i64,
    temperature_2m: f64,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    weather_code: Option<i32>,
    wind_speed_10m: Option<f64>,
    pressure_msl: Option<f64>,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    async fn geocode(&self, query: &str) -> Result<Option<Location>, FetchError> {
        let url = format!("{}/v1/search", self.geocoding_url);
        let body = get_json(
            &self.http,
            &url,
            &[("name", query), ("count", "1"), ("language", LANGUAGE), ("format", "json")],
            ProviderId::OpenMeteo,
            "geocoding",
        )
        .await?;

        let payload: GeocodeResponse = decode(body, ProviderId::OpenMeteo, "geocoding")?;

        Ok(payload.results.unwrap_or_default().into_iter().next().map(|entry| Location {
            name: entry.name,
            country: entry.country.unwrap_or_default(),
            latitude: entry.latitude,
            longitude: entry.longitude,
            // filled in from the forecast payload
            timezone_offset_seconds: 0,
        }))
    }

    async fn fetch(&self, location: &Location) -> Result<RawForecast, FetchError> {
        let url = format!("{}/v1/forecast", self.forecast_url);
        let body = get_json(
            &self.http,
            &url,
            &[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
                ("timeformat", "unixtime".to_string()),
                ("wind_speed_unit", "ms".to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ],
            ProviderId::OpenMeteo,
            "forecast",
        )
        .await?;

        let header: ForecastHeader = decode(body.clone(), ProviderId::OpenMeteo, "forecast")?;
        let current = header.current;
        let condition_code = current.weather_code.unwrap_or(UNKNOWN_CONDITION_CODE);

        let current = CurrentConditions {
            observed_at: DateTime::from_timestamp(current.time, 0).unwrap_or_else(Utc::now),
            temperature: current.temperature_2m,
            apparent_temperature: current.apparent_temperature,
            humidity_pct: current.relative_humidity_2m,
            pressure_hpa: current.pressure_msl,
            wind_speed_mps: current.wind_speed_10m,
            condition_code,
            description: describe_condition(condition_code).description.to_string(),
        };

        Ok(RawForecast {
            current,
            payload: body.get("daily").cloned().unwrap_or(Value::Null),
            shape: PayloadShape::Columnar,
            timezone_offset_seconds: header.utc_offset_seconds,
        })
    }
}
