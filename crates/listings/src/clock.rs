use chrono::{DateTime, Duration, Utc};

pub const KST_LABEL: &str = "KST (UTC+9)";

const KST_OFFSET_HOURS: i64 = 9;

/// Source of wall-clock time for the feed.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Formats `at + offset_minutes` as `YYYY-MM-DDTHH:MM:SS+09:00`, regardless
/// of the host timezone.
pub fn kst_timestamp(at: DateTime<Utc>, offset_minutes: i64) -> String {
    let shifted = at + Duration::minutes(offset_minutes) + Duration::hours(KST_OFFSET_HOURS);
    shifted.format("%Y-%m-%dT%H:%M:%S+09:00").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kst_timestamp_shifts_nine_hours() {
        let at = Utc.with_ymd_and_hms(2025, 11, 18, 6, 20, 5).unwrap();
        assert_eq!(kst_timestamp(at, 0), "2025-11-18T15:20:05+09:00");
    }

    #[test]
    fn kst_timestamp_applies_offset_across_midnight() {
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 14, 59, 30).unwrap();
        assert_eq!(kst_timestamp(at, 1), "2026-01-01T00:00:30+09:00");
        assert_eq!(kst_timestamp(at, -60), "2025-12-31T22:59:30+09:00");
    }
}
