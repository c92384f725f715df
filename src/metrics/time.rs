//! Millisecond timestamp resolution.

use chrono::{DateTime, Utc};

/// Converts a record timestamp into a sample timestamp.
///
/// Expanders accept an override so callers can inject a fixed clock.
pub type TimeFn = fn(i64) -> Option<DateTime<Utc>>;

/// Resolve a millisecond epoch timestamp.
///
/// Returns `None` for `ts_millis <= 0`: an absent timestamp stays absent and
/// is never replaced by the current time here. Values chrono cannot
/// represent also resolve to `None`.
pub fn metric_time(ts_millis: i64) -> Option<DateTime<Utc>> {
    if ts_millis <= 0 {
        return None;
    }
    let secs = ts_millis / 1000;
    let nanos = (ts_millis % 1000) * 1_000_000;
    DateTime::from_timestamp(secs, nanos as u32)
}

/// The override if one was supplied, `metric_time` otherwise
pub(crate) fn resolve_time_fn(time_fn: Option<TimeFn>) -> TimeFn {
    time_fn.unwrap_or(metric_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_non_positive_is_unset() {
        assert_eq!(metric_time(0), None);
        assert_eq!(metric_time(-1), None);
        assert_eq!(metric_time(i64::MIN), None);
    }

    #[test]
    fn test_splits_seconds_and_nanos() {
        let ts = metric_time(1_700_000_000_123).unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.nanosecond(), 123_000_000);
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_smallest_positive() {
        let ts = metric_time(1).unwrap();
        assert_eq!(ts.timestamp(), 0);
        assert_eq!(ts.nanosecond(), 1_000_000);
    }

    #[test]
    fn test_out_of_range_is_unset() {
        assert_eq!(metric_time(i64::MAX), None);
    }

    #[test]
    fn test_override_is_used() {
        fn fixed(_: i64) -> Option<DateTime<Utc>> {
            DateTime::from_timestamp(42, 0)
        }
        let f = resolve_time_fn(Some(fixed));
        assert_eq!(f(0).map(|t| t.timestamp()), Some(42));
        assert_eq!(resolve_time_fn(None)(0), None);
    }
}
