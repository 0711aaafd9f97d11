// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Event timestamps: enrichment from JSON lines and a monotonic generator.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::constants::TIMESTAMP_KEYS;

const OFFSET_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
];
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// Returns the timestamp embedded in a JSON object line, if any.
///
/// Looks at `time`, then `timestamp`. Only the first key present is
/// considered, and its value must be an ISO-8601 string.
pub fn extract_timestamp(line: &str) -> Option<DateTime<Utc>> {
    let value: Value = serde_json::from_str(line).ok()?;
    let object = value.as_object()?;
    let embedded = TIMESTAMP_KEYS.iter().find_map(|key| object.get(*key))?;
    parse_iso8601(embedded.as_str()?)
}

/// The embedded timestamp of `line`, or `fallback` when there is none.
pub fn resolve_timestamp(line: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    extract_timestamp(line).unwrap_or(fallback)
}

/// Parses an ISO-8601 date or date-time and normalizes it to UTC.
///
/// Accepts extended and basic notation, minute precision, hour-only offsets
/// and `,` as the decimal sign. Values without an offset are taken as UTC.
pub fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim().replace(',', ".");
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&s) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(&s, f).ok())
    {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(&s, f).ok())
    {
        return Some(naive.and_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(&s, f).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Hands out timestamps whose millisecond values strictly increase.
///
/// Loki rejects out-of-order entries within a stream, and wall-clock reads
/// collide at millisecond resolution when logging quickly.
#[derive(Debug)]
pub struct MonotonicClock {
    last_millis: Mutex<i64>,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            last_millis: Mutex::new(i64::MIN),
        }
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `timestamp`, pushed forward by whole milliseconds if its
    /// millisecond value is not greater than the last one handed out.
    /// Sub-millisecond precision is kept.
    pub fn next(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let millis = timestamp.timestamp_millis();
        let adjusted = {
            let mut last = self
                .last_millis
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let adjusted = if millis <= *last {
                last.saturating_add(1)
            } else {
                millis
            };
            *last = (*last).max(adjusted);
            adjusted
        };

        TimeDelta::try_milliseconds(adjusted - millis)
            .and_then(|delta| timestamp.checked_add_signed(delta))
            .unwrap_or(timestamp)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.next(Utc::now())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_extract_time_key() {
        let line = r#"{"time":"2024-01-01T00:00:00Z","msg":"hi"}"#;
        assert_eq!(extract_timestamp(line), Some(utc(2024, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_extract_timestamp_key() {
        let line = r#"{"timestamp":"2024-03-04T05:06:07.250Z"}"#;
        let expected = utc(2024, 3, 4, 5, 6, 7) + TimeDelta::milliseconds(250);
        assert_eq!(extract_timestamp(line), Some(expected));
    }

    #[test]
    fn test_time_key_wins_over_timestamp() {
        let line = r#"{"timestamp":"2020-01-01T00:00:00Z","time":"2024-01-01T00:00:00Z"}"#;
        assert_eq!(extract_timestamp(line), Some(utc(2024, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_non_string_time_does_not_fall_through() {
        let line = r#"{"time":1704067200,"timestamp":"2024-01-01T00:00:00Z"}"#;
        assert_eq!(extract_timestamp(line), None);
    }

    #[test]
    fn test_offsets_normalized_to_utc() {
        let line = r#"{"time":"2024-01-01T02:30:00+02:30"}"#;
        assert_eq!(extract_timestamp(line), Some(utc(2024, 1, 1, 0, 0, 0)));
        assert_eq!(
            parse_iso8601("2024-01-01T01:00:00+0100"),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_naive_values_taken_as_utc() {
        assert_eq!(
            parse_iso8601("2024-01-01T12:00:00"),
            Some(utc(2024, 1, 1, 12, 0, 0))
        );
        assert_eq!(
            parse_iso8601("2024-01-01 12:00:00.5"),
            Some(utc(2024, 1, 1, 12, 0, 0) + TimeDelta::milliseconds(500))
        );
        assert_eq!(parse_iso8601("2024-01-01"), Some(utc(2024, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_minute_precision() {
        assert_eq!(
            parse_iso8601("2024-01-01T00:00Z"),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            parse_iso8601("2024-01-01 00:00"),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            parse_iso8601("2024-01-01T01:30+01:00"),
            Some(utc(2024, 1, 1, 0, 30, 0))
        );
    }

    #[test]
    fn test_hour_only_offset() {
        assert_eq!(
            parse_iso8601("2024-01-01T00:00:00+01"),
            Some(utc(2023, 12, 31, 23, 0, 0))
        );
        assert_eq!(
            parse_iso8601("2024-01-01T00:00:00-05"),
            Some(utc(2024, 1, 1, 5, 0, 0))
        );
    }

    #[test]
    fn test_comma_decimal_sign() {
        assert_eq!(
            parse_iso8601("2024-01-01T00:00:00,5Z"),
            Some(utc(2024, 1, 1, 0, 0, 0) + TimeDelta::milliseconds(500))
        );
    }

    #[test]
    fn test_basic_notation() {
        assert_eq!(
            parse_iso8601("20240101T000000Z"),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            parse_iso8601("20240101T013000+0100"),
            Some(utc(2024, 1, 1, 0, 30, 0))
        );
        assert_eq!(parse_iso8601("20240101"), Some(utc(2024, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_minute_precision_line_overrides_record_time() {
        let line = r#"{"timestamp":"2024-01-01T00:00Z"}"#;
        let fallback = utc(2023, 6, 1, 0, 0, 0);
        assert_eq!(
            resolve_timestamp(line, fallback),
            utc(2024, 1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_fallback_cases() {
        let fallback = utc(2023, 6, 1, 0, 0, 0);
        for line in [
            "not json",
            r#"{"foo":"bar"}"#,
            r#"["time","2024-01-01T00:00:00Z"]"#,
            r#""2024-01-01T00:00:00Z""#,
            r#"{"time":"yesterday"}"#,
            r#"{"time":null}"#,
            "",
        ] {
            assert_eq!(resolve_timestamp(line, fallback), fallback, "line: {line}");
        }
    }

    #[test]
    fn test_same_millisecond_bumped_by_one() {
        let clock = MonotonicClock::new();
        let ts = utc(2024, 1, 1, 0, 0, 0) + TimeDelta::microseconds(1_500);
        let first = clock.next(ts);
        let second = clock.next(ts);
        assert_eq!(first, ts);
        assert!(second > first);
        assert_eq!(second, first + TimeDelta::milliseconds(1));
    }

    #[test]
    fn test_earlier_timestamp_does_not_regress() {
        let clock = MonotonicClock::new();
        let late = utc(2024, 1, 1, 0, 0, 10);
        let early = utc(2024, 1, 1, 0, 0, 0);
        let first = clock.next(late);
        let second = clock.next(early);
        assert_eq!(second, first + TimeDelta::milliseconds(1));
    }

    #[test]
    fn test_pre_epoch_timestamp_kept() {
        let clock = MonotonicClock::new();
        let ts = utc(1969, 12, 31, 23, 59, 59);
        assert_eq!(clock.next(ts), ts);
    }

    #[test]
    fn test_later_timestamp_accepted_as_is() {
        let clock = MonotonicClock::new();
        let a = utc(2024, 1, 1, 0, 0, 0);
        let b = utc(2024, 1, 1, 0, 0, 1);
        assert_eq!(clock.next(a), a);
        assert_eq!(clock.next(b), b);
    }

    #[test]
    fn test_concurrent_calls_never_collide() {
        let clock = Arc::new(MonotonicClock::new());
        let ts = utc(2024, 1, 1, 0, 0, 0);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let clock = Arc::clone(&clock);
                std::thread::spawn(move || {
                    (0..250)
                        .map(|_| clock.next(ts).timestamp_millis())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for millis in handle.join().unwrap() {
                assert!(seen.insert(millis), "duplicate millisecond {millis}");
            }
        }
        assert_eq!(seen.len(), 2_000);
    }

    #[test]
    fn test_now_strictly_increases() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now();
        for _ in 0..100 {
            let current = clock.now();
            assert!(current.timestamp_millis() > previous.timestamp_millis());
            previous = current;
        }
    }
}
