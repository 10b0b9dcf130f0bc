use crate::error::{google_calendar_error, BotResult};
use crate::utils::time::local_midnight;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::cmp::Ordering;

/// Start of an event, as parsed from the `start` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStart {
    /// `dateTime` with an explicit offset
    Timed(DateTime<FixedOffset>),
    /// `dateTime` without an offset, read in the configured timezone
    Floating(NaiveDateTime),
    /// All-day `date`
    AllDay(NaiveDate),
}

impl EventStart {
    /// Calendar date of the start in the given timezone
    pub fn local_date(&self, tz: Tz) -> NaiveDate {
        match self {
            EventStart::Timed(dt) => dt.with_timezone(&tz).date_naive(),
            EventStart::Floating(naive) => naive.date(),
            EventStart::AllDay(date) => *date,
        }
    }

    /// Instant of the start; all-day events start at local midnight
    pub fn instant(&self, tz: Tz) -> Option<DateTime<Utc>> {
        match self {
            EventStart::Timed(dt) => Some(dt.with_timezone(&Utc)),
            EventStart::Floating(naive) => tz
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            EventStart::AllDay(date) => local_midnight(*date, tz),
        }
    }
}

/// Parse a start value produced by the event projection
pub fn parse_event_start(value: &str) -> BotResult<EventStart> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(EventStart::Timed(dt));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(EventStart::Floating(naive));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(EventStart::AllDay)
        .map_err(|e| {
            google_calendar_error(&format!("Failed to parse event start '{}': {}", value, e))
        })
}

/// Chronological ordering of two start values; unparseable values sort last
pub fn compare_starts(a: &str, b: &str, tz: Tz) -> Ordering {
    let key = |value: &str| parse_event_start(value).ok().and_then(|start| start.instant(tz));

    match (key(a), key(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
