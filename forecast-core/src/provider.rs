use crate::{
    Config,
    error::FetchError,
    extract::PayloadShape,
    model::{CurrentConditions, Location},
    provider::{openmeteo::OpenMeteoProvider, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{fmt::Debug, time::Duration};

pub mod openmeteo;
pub mod openweather;

/// Units requested from every provider.
pub const UNITS: &str = "metric";
/// Language requested from every provider.
pub const LANGUAGE: &str = "en";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenWeather,
    OpenMeteo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::OpenMeteo => "openmeteo",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::OpenMeteo]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::OpenWeather)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "openmeteo" | "open-meteo" => Ok(ProviderId::OpenMeteo),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, openmeteo."
            )),
        }
    }
}

/// What a provider hands to the core: current conditions, plus the raw
/// forecast payload and the shape needed to read it.
#[derive(Debug, Clone)]
pub struct RawForecast {
    pub current: CurrentConditions,
    pub payload: Value,
    pub shape: PayloadShape,
    pub timezone_offset_seconds: i32,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Resolve a free-text city query. `Ok(None)` when nothing matched.
    async fn geocode(&self, query: &str) -> Result<Option<Location>, FetchError>;

    async fn fetch(&self, location: &Location) -> Result<RawForecast, FetchError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{id}'.\n\
                     Hint: run `forecast configure {id}` and enter your API key."
                )
            })?;
            let mut provider = OpenWeatherProvider::new(api_key.to_owned());
            if let Some(base_url) = config.provider_base_url(id) {
                provider = provider.with_base_url(base_url);
            }
            Box::new(provider)
        }
        ProviderId::OpenMeteo => {
            let mut provider = OpenMeteoProvider::new();
            if let Some(base_url) = config.provider_base_url(id) {
                provider = provider.with_forecast_url(base_url);
            }
            if let Some(geocoding_url) = config.provider_geocoding_url(id) {
                provider = provider.with_geocoding_url(geocoding_url);
            }
            Box::new(provider)
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

pub(crate) fn http_client() -> Client {
    Client::builder().timeout(REQUEST_TIMEOUT).build().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "falling back to default HTTP client");
        Client::new()
    })
}

/// GET `url` and decode the body as JSON, mapping every failure to a
/// [`FetchError`] that names the provider and endpoint.
pub(crate) async fn get_json<Q: Serialize + ?Sized>(
    http: &Client,
    url: &str,
    query: &Q,
    provider: ProviderId,
    endpoint: &'static str,
) -> Result<Value, FetchError> {
    let provider = provider.as_str();
    tracing::debug!(provider, endpoint, url, "sending request");

    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| FetchError::Transport { provider, endpoint, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| FetchError::Transport { provider, endpoint, source })?;

    if !status.is_success() {
        return Err(FetchError::Status { provider, endpoint, status, body: truncate_body(&body) });
    }

    serde_json::from_str(&body).map_err(|source| FetchError::Decode { provider, endpoint, source })
}

pub(crate) fn decode<T: DeserializeOwned>(
    value: Value,
    provider: ProviderId,
    endpoint: &'static str,
) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|source| FetchError::Decode {
        provider: provider.as_str(),
        endpoint,
        source,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
