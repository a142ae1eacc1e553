//! Adapts provider payloads into an ordered sequence of [`WeatherSample`]s.
//!
//! Extraction never fails: missing or malformed columns and records degrade to
//! absent fields or fewer samples, so the caller can still show current
//! conditions when the forecast part of a payload is unusable.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{condition::UNKNOWN_CONDITION_CODE, model::WeatherSample};

/// How a provider lays out its time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    /// Parallel arrays (`time`, `weather_code`, `temperature_2m_max`, ...)
    /// correlated by index.
    Columnar,
    /// A list of per-instant records, each with nested `main` / `weather`.
    DiscreteSamples,
}

pub fn extract_samples(payload: &Value, shape: PayloadShape) -> Vec<WeatherSample> {
    let mut samples = match shape {
        PayloadShape::Columnar => extract_columnar(payload),
        PayloadShape::DiscreteSamples => extract_discrete(payload),
    };
    // stable: equal instants keep arrival order
    samples.sort_by_key(|s| s.timestamp_utc);

    tracing::debug!(?shape, count = samples.len(), "extracted weather samples");
    samples
}

fn extract_columnar(payload: &Value) -> Vec<WeatherSample> {
    let block = columns_block(payload);

    let Some(times) = block.get("time").and_then(Value::as_array) else {
        tracing::debug!("columnar payload has no time column");
        return Vec::new();
    };

    let codes = column(block, &["weather_code", "weathercode"]);
    let temps = column(block, &["temperature_2m"]);
    let maxes = column(block, &["temperature_2m_max"]);
    let mins = column(block, &["temperature_2m_min"]);
    let apparent = column(block, &["apparent_temperature"]);
    let humidity = column(block, &["relative_humidity_2m"]);
    let pressure = column(block, &["pressure_msl"]);

    let mut out = Vec::with_capacity(times.len());
    for (idx, raw_time) in times.iter().enumerate() {
        let Some(timestamp_utc) = parse_timestamp(raw_time) else {
            tracing::debug!(idx, time = ?raw_time, "skipping row without a usable time");
            continue;
        };

        let temperature_max = number_at(maxes, idx);
        let temperature_min = number_at(mins, idx);
        let Some(temperature) =
            number_at(temps, idx).or_else(|| midpoint(temperature_min, temperature_max))
        else {
            continue;
        };

        out.push(WeatherSample {
            timestamp_utc,
            temperature,
            temperature_min,
            temperature_max,
            condition_code: code_at(codes, idx),
            apparent_temperature: number_at(apparent, idx),
            humidity_pct: number_at(humidity, idx),
            pressure_hpa: number_at(pressure, idx),
        });
    }
    out
}

/// The object holding the columns: the payload itself, or its `daily`
/// (preferred) or `hourly` block.
fn columns_block(payload: &Value) -> &Value {
    if payload.get("time").is_some() {
        return payload;
    }
    ["daily", "hourly"]
        .iter()
        .find_map(|key| payload.get(*key).filter(|b| b.get("time").is_some()))
        .unwrap_or(payload)
}

fn column<'a>(block: &'a Value, names: &[&str]) -> Option<&'a [Value]> {
    names
        .iter()
        .find_map(|name| block.get(*name).and_then(Value::as_array))
        .map(Vec::as_slice)
}

fn number_at(column: Option<&[Value]>, idx: usize) -> Option<f64> {
    column?.get(idx)?.as_f64()
}

fn code_at(column: Option<&[Value]>, idx: usize) -> i32 {
    number_at(column, idx)
        .and_then(|v| i32::try_from(v as i64).ok())
        .unwrap_or(UNKNOWN_CONDITION_CODE)
}

fn midpoint(min: Option<f64>, max: Option<f64>) -> Option<f64> {
    match (min, max) {
        (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
        (lo, hi) => lo.or(hi),
    }
}

fn extract_discrete(payload: &Value) -> Vec<WeatherSample> {
    let records = payload
        .as_array()
        .or_else(|| payload.get("list").and_then(Value::as_array));

    let Some(records) = records else {
        tracing::debug!("discrete payload has no sample list");
        return Vec::new();
    };

    records.iter().filter_map(discrete_record).collect()
}

fn discrete_record(record: &Value) -> Option<WeatherSample> {
    let Some(timestamp_utc) = record.get("dt").and_then(parse_timestamp) else {
        tracing::debug!(dt = ?record.get("dt"), "skipping record without a usable dt");
        return None;
    };
    let main = record.get("main")?;
    let temperature = main.get("temp")?.as_f64()?;

    let condition_code = record
        .get("weather")
        .and_then(|w| w.get(0))
        .and_then(|w| w.get("id"))
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .unwrap_or(UNKNOWN_CONDITION_CODE);

    let field = |name: &str| main.get(name).and_then(Value::as_f64);

    Some(WeatherSample {
        timestamp_utc,
        temperature,
        temperature_min: field("temp_min"),
        temperature_max: field("temp_max"),
        condition_code,
        apparent_temperature: field("feels_like"),
        humidity_pct: field("humidity"),
        pressure_hpa: field("pressure"),
    })
}

/// Largest epoch magnitude accepted from a float, about year 5138.
const MAX_FLOAT_EPOCH: f64 = 1e11;

/// Unix seconds (integer or float), RFC 3339, or an ISO-8601 local datetime
/// without offset (read as UTC).
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(secs) = value.as_i64() {
        return DateTime::from_timestamp(secs, 0);
    }
    if let Some(secs) = value.as_f64() {
        if !secs.is_finite() || secs.abs() > MAX_FLOAT_EPOCH {
            tracing::debug!(secs, "unix timestamp out of range");
            return None;
        }
        return DateTime::from_timestamp(secs.floor() as i64, 0);
    }
    let raw = value.as_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|ndt| ndt.and_utc())
}
