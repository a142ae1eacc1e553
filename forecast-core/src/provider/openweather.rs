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
    provider::{LANGUAGE, UNITS, decode, get_json, http_client},
};

use super::{ProviderId, RawForecast, WeatherProvider};

const BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeather: 5 day / 3 hour forecast as a list of discrete samples.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: BASE_URL.to_string(), http: http_client() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_current(&self, location: &Location) -> Result<OwCurrentResponse, FetchError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let body = get_json(
            &self.http,
            &url,
            &self.coordinate_query(location),
            ProviderId::OpenWeather,
            "current weather",
        )
        .await?;

        decode(body, ProviderId::OpenWeather, "current weather")
    }

    async fn fetch_forecast(&self, location: &Location) -> Result<Value, FetchError> {
        let url = format!("{}/data/2.5/forecast", self.base_url);
        get_json(
            &self.http,
            &url,
            &self.coordinate_query(location),
            ProviderId::OpenWeather,
            "forecast",
        )
        .await
    }

    fn coordinate_query(&self, location: &Location) -> [(&'static str, String); 5] {
        [
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", UNITS.to_string()),
            ("lang", LANGUAGE.to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct OwGeocodeEntry {
    name: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i32,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    timezone: Option<i32>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn geocode(&self, query: &str) -> Result<Option<Location>, FetchError> {
        let url = format!("{}/geo/1.0/direct", self.base_url);
        let body = get_json(
            &self.http,
            &url,
            &[("q", query), ("limit", "1"), ("appid", self.api_key.as_str())],
            ProviderId::OpenWeather,
            "geocoding",
        )
        .await?;

        let entries: Vec<OwGeocodeEntry> = decode(body, ProviderId::OpenWeather, "geocoding")?;

        Ok(entries.into_iter().next().map(|entry| Location {
            name: entry.name,
            country: entry.country,
            latitude: entry.lat,
            longitude: entry.lon,
            // filled in from the weather payloads
            timezone_offset_seconds: 0,
        }))
    }

    async fn fetch(&self, location: &Location) -> Result<RawForecast, FetchError> {
        let (current, forecast) =
            tokio::try_join!(self.fetch_current(location), self.fetch_forecast(location))?;

        let timezone_offset_seconds = current
            .timezone
            .or_else(|| {
                forecast
                    .pointer("/city/timezone")
                    .and_then(Value::as_i64)
                    .and_then(|v| i32::try_from(v).ok())
            })
            .unwrap_or(location.timezone_offset_seconds);

        let condition_code = current.weather.first().map_or(UNKNOWN_CONDITION_CODE, |w| w.id);

        let current = CurrentConditions {
            observed_at: DateTime::from_timestamp(current.dt, 0).unwrap_or_else(Utc::now),
            temperature: current.main.temp,
            apparent_temperature: current.main.feels_like,
            humidity_pct: current.main.humidity,
            pressure_hpa: current.main.pressure,
            wind_speed_mps: current.wind.map(|w| w.speed),
            condition_code,
            description: describe_condition(condition_code).description.to_string(),
        };

        Ok(RawForecast {
            current,
            payload: forecast,
            shape: PayloadShape::DiscreteSamples,
            timezone_offset_seconds,
        })
    }
}
