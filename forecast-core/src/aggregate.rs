//! Buckets samples by the location's local calendar day and reduces each
//! bucket to a [`DaySummary`].

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate, Offset, Timelike, Utc};

use crate::{
    condition::describe_condition,
    model::{DaySummary, WeatherSample},
};

const NOON_SECONDS: i64 = 12 * 60 * 60;

/// Group `samples` by local day (using the location's offset, not the
/// viewer's clock) and summarize each day. Output is sorted ascending by date
/// with one entry per date; empty input gives empty output.
pub fn aggregate_by_local_day(
    samples: &[WeatherSample],
    timezone_offset_seconds: i32,
) -> Vec<DaySummary> {
    let offset = fixed_offset(timezone_offset_seconds);

    let mut buckets: BTreeMap<NaiveDate, Vec<&WeatherSample>> = BTreeMap::new();
    for sample in samples {
        let local_date = sample.timestamp_utc.with_timezone(&offset).date_naive();
        buckets.entry(local_date).or_default().push(sample);
    }

    let days: Vec<DaySummary> = buckets
        .into_iter()
        .filter_map(|(local_date, bucket)| summarize(local_date, &bucket, offset))
        .collect();

    tracing::debug!(samples = samples.len(), days = days.len(), "aggregated forecast by local day");
    days
}

/// The bucket member whose local time is closest to 12:00. Ties go to the
/// earliest member; `None` only for an empty bucket.
pub fn select_representative<'a>(
    bucket: &[&'a WeatherSample],
    timezone_offset_seconds: i32,
) -> Option<&'a WeatherSample> {
    pick_closest_to_noon(bucket, fixed_offset(timezone_offset_seconds))
}

fn pick_closest_to_noon<'a>(
    bucket: &[&'a WeatherSample],
    offset: FixedOffset,
) -> Option<&'a WeatherSample> {
    let mut best: Option<(&'a WeatherSample, i64)> = None;
    for &sample in bucket {
        let local = sample.timestamp_utc.with_timezone(&offset);
        let distance = (i64::from(local.num_seconds_from_midnight()) - NOON_SECONDS).abs();
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((sample, distance)),
        }
    }
    best.map(|(sample, _)| sample)
}

fn summarize(
    local_date: NaiveDate,
    bucket: &[&WeatherSample],
    offset: FixedOffset,
) -> Option<DaySummary> {
    let representative = pick_closest_to_noon(bucket, offset)?;

    let mut min_temperature = bucket
        .iter()
        .map(|s| s.temperature_min.unwrap_or(s.temperature))
        .fold(f64::INFINITY, f64::min);
    let mut max_temperature = bucket
        .iter()
        .map(|s| s.temperature_max.unwrap_or(s.temperature))
        .fold(f64::NEG_INFINITY, f64::max);

    if min_temperature > max_temperature {
        tracing::warn!(%local_date, min_temperature, max_temperature, "provider bounds inverted, swapping");
        std::mem::swap(&mut min_temperature, &mut max_temperature);
    }

    Some(DaySummary {
        local_date,
        min_temperature,
        max_temperature,
        representative_condition_code: representative.condition_code,
        representative_description: describe_condition(representative.condition_code)
            .description
            .to_string(),
    })
}

fn fixed_offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| {
        tracing::warn!(seconds, "timezone offset out of range, using UTC");
        Utc.fix()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{PayloadShape, extract_samples};
    use chrono::DateTime;
    use serde_json::json;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).expect("valid timestamp").with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(aggregate_by_local_day(&[], 0).is_empty());
        assert!(aggregate_by_local_day(&[], 32400).is_empty());
    }

    #[test]
    fn columnar_daily_scenario() {
        let payload = json!({
            "time": ["2024-01-01T00:00", "2024-01-01T12:00", "2024-01-02T00:00"],
            "weathercode": [3, 3, 0],
            "temperature_2m_max": [10, 10, 5],
            "temperature_2m_min": [2, 2, -1],
        });
        let samples = extract_samples(&payload, PayloadShape::Columnar);

        let days = aggregate_by_local_day(&samples, 0);
        assert_eq!(days.len(), 2);

        assert_eq!(days[0].local_date, date(2024, 1, 1));
        assert_eq!(days[0].min_temperature, 2.0);
        assert_eq!(days[0].max_temperature, 10.0);
        assert_eq!(days[0].representative_condition_code, 3);
        assert_eq!(days[0].representative_description, "Overcast");

        assert_eq!(days[1].local_date, date(2024, 1, 2));
        assert_eq!(days[1].min_temperature, -1.0);
        assert_eq!(days[1].max_temperature, 5.0);
        assert_eq!(days[1].representative_condition_code, 0);
    }

    #[test]
    fn buckets_use_location_offset_not_utc() {
        let payload = json!([
            { "dt": at("2024-01-01T16:00:00Z").timestamp(), "main": { "temp": 4.0 }, "weather": [{ "id": 800 }] }
        ]);
        let samples = extract_samples(&payload, PayloadShape::DiscreteSamples);

        let days = aggregate_by_local_day(&samples, 32400);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].local_date, date(2024, 1, 2));

        let utc_days = aggregate_by_local_day(&samples, 0);
        assert_eq!(utc_days[0].local_date, date(2024, 1, 1));
    }

    #[test]
    fn negative_offset_moves_early_utc_samples_to_previous_day() {
        let samples = vec![WeatherSample::new(at("2024-03-10T03:00:00Z"), 1.0, 0)];
        let days = aggregate_by_local_day(&samples, -5 * 3600);
        assert_eq!(days[0].local_date, date(2024, 3, 9));
    }

    #[test]
    fn output_is_sorted_and_unique_for_unordered_input() {
        let samples = vec![
            WeatherSample::new(at("2024-01-03T09:00:00Z"), 1.0, 0),
            WeatherSample::new(at("2024-01-01T09:00:00Z"), 2.0, 0),
            WeatherSample::new(at("2024-01-03T15:00:00Z"), 3.0, 0),
            WeatherSample::new(at("2024-01-02T09:00:00Z"), 4.0, 0),
            WeatherSample::new(at("2024-01-01T21:00:00Z"), 5.0, 0),
        ];

        let days = aggregate_by_local_day(&samples, 0);
        let dates: Vec<_> = days.iter().map(|d| d.local_date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn bounds_prefer_min_max_and_fall_back_to_temperature() {
        let mut with_bounds = WeatherSample::new(at("2024-01-01T06:00:00Z"), 5.0, 0);
        with_bounds.temperature_min = Some(1.5);
        with_bounds.temperature_max = Some(6.0);
        let plain_hot = WeatherSample::new(at("2024-01-01T15:00:00Z"), 9.0, 0);
        let plain_cold = WeatherSample::new(at("2024-01-01T21:00:00Z"), 0.5, 0);

        let days = aggregate_by_local_day(&[with_bounds, plain_hot, plain_cold], 0);
        assert_eq!(days[0].min_temperature, 0.5);
        assert_eq!(days[0].max_temperature, 9.0);
    }

    #[test]
    fn single_sample_without_bounds_has_equal_min_and_max() {
        let days = aggregate_by_local_day(&[WeatherSample::new(at("2024-01-01T06:00:00Z"), 7.25, 61)], 0);
        assert_eq!(days[0].min_temperature, 7.25);
        assert_eq!(days[0].max_temperature, 7.25);
        assert_eq!(days[0].representative_condition_code, 61);
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let mut odd = WeatherSample::new(at("2024-01-01T12:00:00Z"), 5.0, 0);
        odd.temperature_min = Some(8.0);
        odd.temperature_max = Some(3.0);

        let days = aggregate_by_local_day(&[odd], 0);
        assert!(days[0].min_temperature <= days[0].max_temperature);
        assert_eq!((days[0].min_temperature, days[0].max_temperature), (3.0, 8.0));
    }

    #[test]
    fn representative_is_closest_to_local_noon() {
        let samples = vec![
            WeatherSample::new(at("2024-01-01T00:00:00Z"), 1.0, 800),
            WeatherSample::new(at("2024-01-01T09:00:00Z"), 1.0, 801),
            WeatherSample::new(at("2024-01-01T15:00:00Z"), 1.0, 500),
            WeatherSample::new(at("2024-01-01T13:00:00Z"), 1.0, 600),
        ];
        let bucket: Vec<&WeatherSample> = samples.iter().collect();

        let picked = select_representative(&bucket, 0).expect("non-empty bucket");
        assert_eq!(picked.condition_code, 600);

        // UTC+3: 09:00Z is local noon
        let picked = select_representative(&bucket, 3 * 3600).expect("non-empty bucket");
        assert_eq!(picked.condition_code, 801);
    }

    #[test]
    fn representative_ties_go_to_earliest_arrival() {
        let samples = vec![
            WeatherSample::new(at("2024-01-01T14:00:00Z"), 1.0, 500),
            WeatherSample::new(at("2024-01-01T10:00:00Z"), 1.0, 800),
        ];
        let bucket: Vec<&WeatherSample> = samples.iter().collect();
        assert_eq!(select_representative(&bucket, 0).map(|s| s.condition_code), Some(500));

        let days = aggregate_by_local_day(&samples, 0);
        assert_eq!(days[0].representative_condition_code, 500);
    }

    #[test]
    fn representative_of_empty_bucket_is_none() {
        assert!(select_representative(&[], 0).is_none());
    }

    #[test]
    fn out_of_range_offset_is_treated_as_utc() {
        let samples = vec![WeatherSample::new(at("2024-01-01T23:00:00Z"), 1.0, 0)];
        let days = aggregate_by_local_day(&samples, 200_000);
        assert_eq!(days[0].local_date, date(2024, 1, 1));
    }
}
