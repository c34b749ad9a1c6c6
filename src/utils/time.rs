//! Timestamp helpers.

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Unix timestamps (seconds) used to pin historical subgraph queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaTimestamps {
    pub one_day: i64,
    pub two_days: i64,
}

/// Timestamps 24h and 48h before `now`, truncated to the minute so
/// repeated lookups within a minute hit the same cached block.
pub fn delta_timestamps(now: DateTime<Utc>) -> DeltaTimestamps {
    let minute = now.duration_trunc(Duration::minutes(1)).unwrap_or(now);
    DeltaTimestamps {
        one_day: (minute - Duration::days(1)).timestamp(),
        two_days: (minute - Duration::days(2)).timestamp(),
    }
}

/// Relative rendering of a past timestamp ("5 minutes ago").
pub fn from_now(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0) as f64;
    let minutes = (seconds / 60.0).round();
    let hours = (seconds / 3600.0).round();
    let days = (seconds / 86_400.0).round();

    if seconds < 45.0 {
        "a few seconds ago".to_string()
    } else if seconds < 90.0 {
        "a minute ago".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes ago", minutes)
    } else if minutes < 90.0 {
        "an hour ago".to_string()
    } else if hours < 22.0 {
        format!("{} hours ago", hours)
    } else if hours < 36.0 {
        "a day ago".to_string()
    } else if days < 26.0 {
        format!("{} days ago", days)
    } else if days < 45.0 {
        "a month ago".to_string()
    } else if days < 320.0 {
        format!("{} months ago", (days / 30.0).round())
    } else if days < 548.0 {
        "a year ago".to_string()
    } else {
        format!("{} years ago", (days / 365.0).round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_delta_timestamps_truncate_to_minute() {
        let now = Utc.with_ymd_and_hms(2022, 5, 10, 12, 30, 45).unwrap();
        let deltas = delta_timestamps(now);
        let base = Utc.with_ymd_and_hms(2022, 5, 10, 12, 30, 0).unwrap().timestamp();
        assert_eq!(deltas.one_day, base - 86_400);
        assert_eq!(deltas.two_days, base - 2 * 86_400);
    }

    #[test]
    fn test_from_now_buckets() {
        let now = Utc.with_ymd_and_hms(2022, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(from_now(now - Duration::seconds(10), now), "a few seconds ago");
        assert_eq!(from_now(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(from_now(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(from_now(now - Duration::days(3), now), "3 days ago");
        // future timestamps clamp to "now"
        assert_eq!(from_now(now + Duration::minutes(5), now), "a few seconds ago");
    }
}
