use super::client::{CalendarProvider, EventQuery};
use super::credentials::CalendarId;
use super::models::{CalendarEvent, EventsPage};
use super::time::compare_starts;
use crate::config::{Config, DEFAULT_MAX_RESULTS, DEFAULT_TZ};
use crate::error::{config_error, BotResult};
use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use tracing::info;

/// Options for a single fetch
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub max_results: u32,
    /// Explicit lower bound; `None` means now minus `lookback_days`
    pub time_min: Option<DateTime<Utc>>,
    pub lookback_days: i64,
    pub timezone: Tz,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            time_min: None,
            lookback_days: 0,
            timezone: DEFAULT_TZ,
        }
    }
}

impl FetchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_results: config.max_results,
            time_min: None,
            lookback_days: config.lookback_days,
            timezone: config.timezone,
        }
    }

    /// Lower time bound of the query
    pub fn resolve_time_min(&self, now: DateTime<Utc>) -> BotResult<DateTime<Utc>> {
        if let Some(time_min) = self.time_min {
            return Ok(time_min);
        }

        TimeDelta::try_days(self.lookback_days)
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .ok_or_else(|| {
                config_error(&format!(
                    "Lookback of {} days is out of range",
                    self.lookback_days
                ))
            })
    }
}

/// Fetch upcoming events with one list call and project them
pub async fn fetch_events<P>(
    provider: &P,
    calendar_id: &CalendarId,
    options: &FetchOptions,
) -> BotResult<Vec<CalendarEvent>>
where
    P: CalendarProvider + ?Sized,
{
    let query = EventQuery {
        calendar_id: calendar_id.clone(),
        time_min: options.resolve_time_min(Utc::now())?,
        max_results: options.max_results,
    };

    info!(
        "Fetching up to {} events from {} starting {}",
        query.max_results, query.calendar_id, query.time_min
    );

    let page = provider.list_events(&query).await?;

    Ok(project_events(page, options.timezone))
}

/// Project a response page into events, sorted by start.
///
/// The sort is stable and only matters when timed and all-day events are mixed.
pub fn project_events(page: EventsPage, tz: Tz) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = page.items.into_iter().map(CalendarEvent::from).collect();
    events.sort_by(|a, b| compare_starts(&a.start, &b.start, tz));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::models::RawEvent;
    use chrono::TimeZone;
    use serde_json::json;

    fn page(items: serde_json::Value) -> EventsPage {
        serde_json::from_value(json!({ "items": items })).unwrap()
    }

    #[test]
    fn test_resolve_time_min() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();

        let options = FetchOptions::default();
        assert_eq!(options.resolve_time_min(now).unwrap(), now);

        let options = FetchOptions {
            lookback_days: 1,
            ..Default::default()
        };
        assert_eq!(
            options.resolve_time_min(now).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
        );

        let explicit = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let options = FetchOptions {
            time_min: Some(explicit),
            lookback_days: 1,
            ..Default::default()
        };
        assert_eq!(options.resolve_time_min(now).unwrap(), explicit);
    }

    #[test]
    fn test_resolve_time_min_out_of_range_is_config_error() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();

        for lookback_days in [1_000_000_000, i64::MAX] {
            let options = FetchOptions {
                lookback_days,
                ..Default::default()
            };
            assert!(matches!(
                options.resolve_time_min(now),
                Err(crate::error::Error::Config(_))
            ));
        }
    }

    #[test]
    fn test_default_timezone_matches_config() {
        assert_eq!(FetchOptions::default().timezone, DEFAULT_TZ);
    }

    #[test]
    fn test_project_mixed_events() {
        let events = project_events(
            page(json!([
                {"summary": "Late borrel", "start": {"dateTime": "2024-06-03T21:00:00+02:00"}, "end": {"dateTime": "2024-06-03T23:00:00+02:00"}},
                {"start": {"date": "2024-06-03"}, "end": {"date": "2024-06-04"}},
                {"summary": "Early borrel", "location": "Dak", "start": {"dateTime": "2024-06-01T17:00:00+02:00", "date": "2024-06-01"}}
            ])),
            chrono_tz::Europe::Amsterdam,
        );

        let starts: Vec<&str> = events.iter().map(|e| e.start.as_str()).collect();
        assert_eq!(
            starts,
            vec![
                "2024-06-01T17:00:00+02:00",
                "2024-06-03",
                "2024-06-03T21:00:00+02:00"
            ]
        );
        assert_eq!(events[0].name, "Early borrel");
        assert_eq!(events[0].location, "Dak");
        assert_eq!(events[0].end, None);
        assert_eq!(events[1].name, "Unnamed Event");
        assert_eq!(events[1].location, "Unknown");
    }

    #[test]
    fn test_project_keeps_order_of_equal_starts() {
        let raw = |name: &str| RawEvent {
            summary: Some(name.to_string()),
            start: crate::components::google_calendar::models::EventDateTime {
                date: Some("2024-06-01".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let events = project_events(
            EventsPage {
                items: vec![raw("first"), raw("second")],
                next_page_token: None,
            },
            chrono_tz::UTC,
        );
        assert_eq!(events[0].name, "first");
        assert_eq!(events[1].name, "second");
    }
}
