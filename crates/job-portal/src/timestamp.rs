//! Timestamp parsing shared by the CSV importer and the CLI.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Where a bare `YYYY-MM-DD` date lands within its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOnly {
    /// `00:00:00` UTC. Used for reference clocks such as `--now`.
    StartOfDay,
    /// `23:59:59` UTC. Used for expiry dates so a posting stays open through that day.
    EndOfDay,
}

impl DateOnly {
    fn place(self, date: NaiveDate) -> Option<NaiveDateTime> {
        match self {
            DateOnly::StartOfDay => date.and_hms_opt(0, 0, 0),
            DateOnly::EndOfDay => date.and_hms_opt(23, 59, 59),
        }
    }
}

/// Parses an RFC 3339 timestamp, or a bare date placed according to `date_only`.
pub fn parse_timestamp(raw: &str, date_only: DateOnly) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date_only.place(date))
        .map(|naive| naive.and_utc())
}
