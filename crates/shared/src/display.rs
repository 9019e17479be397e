//! Formatting helpers shared by all views.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Format seconds as `M:SS`; missing values render as `--:--`.
pub fn format_duration(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite()) else {
        return "--:--".to_string();
    };
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, naive ISO-8601 date-times (taken as UTC) and plain
/// dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a timestamp as a calendar date (`May 3, 2024`), or verbatim if it
/// cannot be parsed.
pub fn format_calendar_date(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => value.to_string(),
    }
}

/// Render the distance between `then` and `now` in words, e.g.
/// `about 3 hours ago`.
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let (seconds, suffix_future) = if delta.num_seconds() < 0 {
        (-delta.num_seconds(), true)
    } else {
        (delta.num_seconds(), false)
    };

    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let months = days / 30;
    let years = days / 365;

    let distance = if seconds < 60 {
        "less than a minute".to_string()
    } else if minutes < 45 {
        plural(minutes, "minute")
    } else if hours < 24 {
        format!("about {}", plural(hours.max(1), "hour"))
    } else if days < 30 {
        plural(days, "day")
    } else if months < 12 {
        format!("about {}", plural(months, "month"))
    } else {
        format!("about {}", plural(years.max(1), "year"))
    };

    if suffix_future {
        format!("in {}", distance)
    } else {
        format!("{} ago", distance)
    }
}

/// Relative upload time for a raw timestamp; falls back to the raw string.
pub fn format_relative_str(value: &str, now: DateTime<Utc>) -> String {
    match parse_timestamp(value) {
        Some(then) => format_relative(then, now),
        None => value.to_string(),
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
