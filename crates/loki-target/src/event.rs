// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, TimeZone, Utc};

use crate::label::LabelSet;

/// One log entry, ready to be pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LokiEvent {
    labels: LabelSet,
    timestamp: DateTime<Utc>,
    line: String,
}

impl LokiEvent {
    pub fn new<Tz: TimeZone>(labels: LabelSet, timestamp: DateTime<Tz>, line: String) -> Self {
        Self {
            labels,
            timestamp: timestamp.with_timezone(&Utc),
            line,
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// Unix time in nanoseconds, as a decimal string.
    pub fn timestamp_nanos(&self) -> String {
        let nanos = i128::from(self.timestamp.timestamp()) * 1_000_000_000
            + i128::from(self.timestamp.timestamp_subsec_nanos());
        nanos.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::label::Label;
    use chrono::FixedOffset;

    #[test]
    fn test_timestamp_stored_as_utc() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let ts = offset.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let event = LokiEvent::new(LabelSet::default(), ts, "x".into());
        assert_eq!(
            event.timestamp(),
            Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_timestamp_nanos() {
        let labels = LabelSet::new([Label::new("app", "web").unwrap()]).unwrap();
        let ts = Utc.timestamp_opt(1_702_400_000, 123_456_789).unwrap();
        let event = LokiEvent::new(labels, ts, "x".into());
        assert_eq!(event.timestamp_nanos(), "1702400000123456789");
    }

    #[test]
    fn test_timestamp_nanos_before_epoch() {
        let ts = Utc.timestamp_opt(-1, 500_000_000).unwrap();
        let event = LokiEvent::new(LabelSet::default(), ts, String::new());
        assert_eq!(event.timestamp_nanos(), "-500000000");
    }
}
