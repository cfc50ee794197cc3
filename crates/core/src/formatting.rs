//! Display helpers for API payloads.

use chrono::{DateTime, Utc};

/// Format a duration in seconds as `m:ss`, or `h:mm:ss` from one hour up.
pub fn duration_label(total_secs: i64) -> String {
    let total = total_secs.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Relative label for a past timestamp: `just now`, `5 minutes ago`,
/// `3 hours ago`, `2 days ago`, falling back to `YYYY-MM-DD` after a week.
pub fn relative_label(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };
    match secs {
        s if s < 3600 => plural(s / 60, "minute"),
        s if s < 86_400 => plural(s / 3600, "hour"),
        s if s < 7 * 86_400 => plural(s / 86_400, "day"),
        _ => at.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn short_durations() {
        assert_eq!(duration_label(0), "0:00");
        assert_eq!(duration_label(65), "1:05");
        assert_eq!(duration_label(-3), "0:00");
    }

    #[test]
    fn long_durations() {
        assert_eq!(duration_label(3600), "1:00:00");
        assert_eq!(duration_label(3725), "1:02:05");
    }

    #[test]
    fn relative_labels() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(relative_label(now - Duration::seconds(30), now), "just now");
        assert_eq!(relative_label(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_label(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_label(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(relative_label(now - Duration::days(2), now), "2 days ago");
        assert_eq!(relative_label(now - Duration::days(30), now), "2026-02-08");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(relative_label(now + Duration::minutes(5), now), "just now");
    }
}
