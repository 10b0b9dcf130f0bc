//! Reduction of fetched events into the status record written to disk.

pub mod writer;

use crate::components::google_calendar::time::parse_event_start;
use crate::components::google_calendar::CalendarEvent;
use crate::error::{config_error, Error};
use crate::utils::time::{days_between, updated_at};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub use writer::{read_status, write_status};

/// Which status record a run produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusMode {
    /// Every fetched event
    #[default]
    Events,
    /// Whether there is a borrel today, and how many days until the next one
    Today,
    /// Start of the next borrel only
    Next,
}

impl FromStr for StatusMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "events" => Ok(StatusMode::Events),
            "today" => Ok(StatusMode::Today),
            "next" => Ok(StatusMode::Next),
            other => Err(config_error(&format!(
                "Invalid status mode '{}', expected one of: events, today, next",
                other
            ))),
        }
    }
}

impl fmt::Display for StatusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusMode::Events => "events",
            StatusMode::Today => "today",
            StatusMode::Next => "next",
        };
        f.write_str(name)
    }
}

/// Contents of the status file. Each variant keeps its own flat JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusRecord {
    Events {
        updated_at: String,
        events: Vec<CalendarEvent>,
    },
    Today {
        updated_at: String,
        borrel_today: bool,
        borrel_days: Option<i64>,
    },
    Next {
        next_borrel: Option<String>,
        updated_at: String,
    },
}

impl StatusRecord {
    /// Reduce chronologically sorted events into a record.
    ///
    /// `now` decides both `updated_at` and, in its timezone, what "today" is.
    pub fn reduce(mode: StatusMode, events: Vec<CalendarEvent>, now: DateTime<Tz>) -> Self {
        let updated_at = updated_at(&now.with_timezone(&Utc));

        match mode {
            StatusMode::Events => StatusRecord::Events { updated_at, events },
            StatusMode::Today => {
                let (borrel_today, borrel_days) =
                    today_and_next(&events, now.date_naive(), now.timezone());
                StatusRecord::Today {
                    updated_at,
                    borrel_today,
                    borrel_days,
                }
            }
            StatusMode::Next => StatusRecord::Next {
                next_borrel: events.into_iter().next().map(|event| event.start),
                updated_at,
            },
        }
    }

    pub fn mode(&self) -> StatusMode {
        match self {
            StatusRecord::Events { .. } => StatusMode::Events,
            StatusRecord::Today { .. } => StatusMode::Today,
            StatusRecord::Next { .. } => StatusMode::Next,
        }
    }

    pub fn updated_at(&self) -> &str {
        match self {
            StatusRecord::Events { updated_at, .. }
            | StatusRecord::Today { updated_at, .. }
            | StatusRecord::Next { updated_at, .. } => updated_at,
        }
    }
}

/// Whether any event falls on `today`, and the smallest positive day count to a later one.
///
/// Today is day 0 and never counts as "next". Ties keep the first event found.
fn today_and_next(events: &[CalendarEvent], today: NaiveDate, tz: Tz) -> (bool, Option<i64>) {
    let mut borrel_today = false;
    let mut borrel_days: Option<i64> = None;

    for event in events {
        let start = match parse_event_start(&event.start) {
            Ok(start) => start,
            Err(e) => {
                warn!("Skipping event '{}': {}", event.name, e);
                continue;
            }
        };

        let delta = days_between(today, start.local_date(tz));
        if delta == 0 {
            borrel_today = true;
        } else if delta > 0 && borrel_days.map_or(true, |days| delta < days) {
            borrel_days = Some(delta);
        }
    }

    (borrel_today, borrel_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Europe::Amsterdam;
    use serde_json::json;

    fn event(start: &str, name: &str) -> CalendarEvent {
        CalendarEvent {
            start: start.to_string(),
            end: None,
            name: name.to_string(),
            location: "Unknown".to_string(),
        }
    }

    fn now() -> DateTime<Tz> {
        Amsterdam.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("events".parse::<StatusMode>().unwrap(), StatusMode::Events);
        assert_eq!(" Today ".parse::<StatusMode>().unwrap(), StatusMode::Today);
        assert_eq!("NEXT".parse::<StatusMode>().unwrap(), StatusMode::Next);
        assert!("weekly".parse::<StatusMode>().is_err());
        assert_eq!(StatusMode::Today.to_string(), "today");
    }

    #[test]
    fn test_events_mode_passes_through() {
        let events = vec![event("2024-06-01", "a"), event("2024-06-02", "b")];
        let record = StatusRecord::reduce(StatusMode::Events, events.clone(), now());

        assert_eq!(
            record,
            StatusRecord::Events {
                updated_at: "2024-06-01T10:00:00+00:00".to_string(),
                events,
            }
        );
    }

    #[test]
    fn test_today_mode_picks_first_of_tied_minimum() {
        let today = now().date_naive();
        let day = |offset: i64| (today + Duration::days(offset)).format("%Y-%m-%d").to_string();
        let events = vec![
            event(&day(0), "today"),
            event(&day(3), "first in three days"),
            event(&day(3), "second in three days"),
            event(&day(5), "later"),
        ];

        let record = StatusRecord::reduce(StatusMode::Today, events, now());
        assert_eq!(
            record,
            StatusRecord::Today {
                updated_at: "2024-06-01T10:00:00+00:00".to_string(),
                borrel_today: true,
                borrel_days: Some(3),
            }
        );
    }

    #[test]
    fn test_today_mode_empty() {
        let record = StatusRecord::reduce(StatusMode::Today, vec![], now());
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "updated_at": "2024-06-01T10:00:00+00:00",
                "borrel_today": false,
                "borrel_days": null
            })
        );
    }

    #[test]
    fn test_today_mode_day_boundary() {
        // 23:30 local today is still today
        let (is_today, days) = today_and_next(
            &[event("2024-06-01T23:30:00+02:00", "late")],
            now().date_naive(),
            Amsterdam,
        );
        assert!(is_today);
        assert_eq!(days, None);

        // 00:30 local tomorrow is one day away, even though it is still 1 June in UTC
        let (is_today, days) = today_and_next(
            &[event("2024-06-01T22:30:00Z", "after midnight")],
            now().date_naive(),
            Amsterdam,
        );
        assert!(!is_today);
        assert_eq!(days, Some(1));
    }

    #[test]
    fn test_today_mode_ignores_past_and_unparseable() {
        let (is_today, days) = today_and_next(
            &[
                event("2024-05-31", "yesterday"),
                event("sometime", "broken"),
                event("2024-06-08T17:00:00+02:00", "next week"),
            ],
            now().date_naive(),
            Amsterdam,
        );
        assert!(!is_today);
        assert_eq!(days, Some(7));
    }

    #[test]
    fn test_next_mode() {
        let events = vec![
            event("2024-06-01T10:00", "first"),
            event("2024-06-02T10:00", "second"),
        ];
        let record = StatusRecord::reduce(StatusMode::Next, events, now());
        assert_eq!(
            record,
            StatusRecord::Next {
                next_borrel: Some("2024-06-01T10:00".to_string()),
                updated_at: "2024-06-01T10:00:00+00:00".to_string(),
            }
        );

        let record = StatusRecord::reduce(StatusMode::Next, vec![], now());
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"next_borrel": null, "updated_at": "2024-06-01T10:00:00+00:00"})
        );
    }

    #[test]
    fn test_untagged_records_deserialize_to_their_variant() {
        let events: StatusRecord =
            serde_json::from_value(json!({"updated_at": "x", "events": []})).unwrap();
        assert_eq!(events.mode(), StatusMode::Events);

        let today: StatusRecord = serde_json::from_value(
            json!({"updated_at": "x", "borrel_today": false, "borrel_days": null}),
        )
        .unwrap();
        assert_eq!(today.mode(), StatusMode::Today);

        let next: StatusRecord =
            serde_json::from_value(json!({"next_borrel": null, "updated_at": "x"})).unwrap();
        assert_eq!(next.mode(), StatusMode::Next);
        assert_eq!(next.updated_at(), "x");
    }
}
