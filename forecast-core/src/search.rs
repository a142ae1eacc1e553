use crate::{
    aggregate::aggregate_by_local_day,
    error::SearchError,
    extract::extract_samples,
    model::{Location, WeatherReport},
    provider::WeatherProvider,
};

/// Run one search: validate the query, geocode it, fetch the forecast and
/// normalize it into a [`WeatherReport`].
///
/// Only validation, geocoding and fetching can fail. An unusable forecast
/// payload produces a report with an empty day list.
pub async fn search(
    provider: &dyn WeatherProvider,
    query: &str,
) -> Result<WeatherReport, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    tracing::info!(provider = %provider.id(), query, "searching");

    let place = provider
        .geocode(query)
        .await?
        .ok_or_else(|| SearchError::LocationNotFound(query.to_string()))?;

    let raw = provider.fetch(&place).await?;

    let location = Location { timezone_offset_seconds: raw.timezone_offset_seconds, ..place };

    let samples = extract_samples(&raw.payload, raw.shape);
    let days = aggregate_by_local_day(&samples, location.timezone_offset_seconds);
    if days.is_empty() {
        tracing::warn!(location = %location.display_name(), "forecast payload yielded no days");
    }

    tracing::info!(
        location = %location.display_name(),
        offset = location.timezone_offset_seconds,
        days = days.len(),
        "search complete"
    );

    Ok(WeatherReport { provider: provider.id(), location, current: raw.current, days })
}
