use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

const SECS_PER_MINUTE: f64 = 60.0;
const SECS_PER_HOUR: f64 = 60.0 * SECS_PER_MINUTE;
const SECS_PER_DAY: f64 = 24.0 * SECS_PER_HOUR;

/// Human phrase for `instant` relative to `now`, using the coarsest unit that
/// fits: "just now" under 45 seconds, then minutes, hours, days.
pub fn relative_time(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = (instant - now).num_seconds() as f64;
    let magnitude = delta.abs();

    if magnitude < 45.0 {
        return "just now".to_string();
    }

    let (amount, unit) = if magnitude < SECS_PER_HOUR {
        (rounded(magnitude, SECS_PER_MINUTE), "minute")
    } else if magnitude < SECS_PER_DAY {
        (rounded(magnitude, SECS_PER_HOUR), "hour")
    } else {
        (rounded(magnitude, SECS_PER_DAY), "day")
    };

    // 59m50s rounds to 60 minutes; say "1 hour" instead
    let (amount, unit) = match (amount, unit) {
        (60, "minute") => (1, "hour"),
        (24, "hour") => (1, "day"),
        other => other,
    };
    let plural = if amount == 1 { "" } else { "s" };

    if delta < 0.0 {
        format!("{amount} {unit}{plural} ago")
    } else {
        format!("in {amount} {unit}{plural}")
    }
}

fn rounded(seconds: f64, unit_seconds: f64) -> i64 {
    ((seconds / unit_seconds).round() as i64).max(1)
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Label for the `index`-th row of a day list; the first row is always "Today".
pub fn day_label(index: usize, date: NaiveDate) -> &'static str {
    if index == 0 { "Today" } else { weekday_name(date) }
}
