//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - The normalized display model (locations, samples, day summaries)
//! - Sample extraction from columnar and discrete-sample payloads
//! - Aggregation of samples into local-day summaries
//! - Condition lookup and small formatting helpers
//! - Configuration, provider adapters and the search pipeline around them
//!
//! Extraction, aggregation and formatting are pure and never fail; only the
//! network-facing parts return errors.

pub mod aggregate;
pub mod condition;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod model;
pub mod provider;
pub mod search;

pub use aggregate::{aggregate_by_local_day, select_representative};
pub use condition::{Condition, describe_condition};
pub use config::{Config, ProviderConfig};
pub use error::{FetchError, SearchError};
pub use extract::{PayloadShape, extract_samples};
pub use model::{CurrentConditions, DaySummary, Location, WeatherReport, WeatherSample};
pub use provider::{ProviderId, RawForecast, WeatherProvider};
pub use search::search;
