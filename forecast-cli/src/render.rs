use std::fmt::Write;

use chrono::{DateTime, Utc};
use forecast_core::{
    WeatherReport, describe_condition,
    format::{day_label, relative_time},
};

pub const DEFAULT_DISPLAY_DAYS: usize = 5;

pub fn render_report(report: &WeatherReport, max_days: usize, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let current = &report.current;
    let condition = describe_condition(current.condition_code);

    let _ = writeln!(out, "{} (via {})", report.location.display_name(), report.provider);
    let _ = writeln!(
        out,
        "{} {}  {}  (updated {})",
        condition.emoji,
        format_temp(current.temperature),
        current.description,
        relative_time(current.observed_at, now),
    );

    let mut details = Vec::new();
    if let Some(feels) = current.apparent_temperature {
        details.push(format!("feels like {}", format_temp(feels)));
    }
    if let Some(humidity) = current.humidity_pct {
        details.push(format!("humidity {humidity:.0}%"));
    }
    if let Some(pressure) = current.pressure_hpa {
        details.push(format!("pressure {pressure:.0} hPa"));
    }
    if let Some(wind) = current.wind_speed_mps {
        details.push(format!("wind {wind:.1} m/s"));
    }
    if !details.is_empty() {
        let _ = writeln!(out, "   {}", details.join(", "));
    }

    out.push('\n');

    if report.days.is_empty() {
        out.push_str("No forecast data available.\n");
        return out;
    }

    for (idx, day) in report.days.iter().take(max_days).enumerate() {
        let emoji = describe_condition(day.representative_condition_code).emoji;
        let _ = writeln!(
            out,
            "{:<10} {} {:>6} / {:<6} {}",
            day_label(idx, day.local_date),
            emoji,
            format_temp(day.max_temperature),
            format_temp(day.min_temperature),
            day.representative_description,
        );
    }

    out
}

fn format_temp(celsius: f64) -> String {
    format!("{}°C", celsius.round() as i64)
}
