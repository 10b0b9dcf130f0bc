use borrel_status::components::google_calendar::CalendarEvent;
use borrel_status::components::status::{StatusMode, StatusRecord};
use borrel_status::config::Config;
use borrel_status::error::{env_error, Error};
use borrel_status::startup::{report, RunSummary};
use chrono::{Duration, TimeZone};
use std::collections::HashMap;
use std::path::PathBuf;

/// Smoke test to verify that the config can be built without touching the environment
#[test]
fn test_config_loads() {
    let map = HashMap::from([
        ("GOOGLE_CALENDAR_ID".to_string(), "borrel@group.calendar.google.com".to_string()),
        ("BORREL_STATUS_MODE".to_string(), "today".to_string()),
    ]);
    let config = Config::from_lookup(|key| map.get(key).cloned()).unwrap();

    assert_eq!(config.mode, StatusMode::Today);
    assert_eq!(config.max_results, 50);
    assert_eq!(config.output_path, PathBuf::from("borrel_status.json"));
}

/// Error kinds can be told apart without looking at the message
#[test]
fn test_error_kinds() {
    let missing_id = env_error("GOOGLE_CALENDAR_ID");
    assert!(matches!(missing_id, Error::Config(_)));

    let io: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
    assert!(matches!(io, Error::Io(_)));
    assert_eq!(io.to_string(), "read-only");
}

/// The printed summary for a today/next run carries the status JSON
#[test]
fn test_summary_message() {
    let now = chrono_tz::Europe::Amsterdam
        .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .unwrap();
    let tomorrow = (now.date_naive() + Duration::days(1)).format("%Y-%m-%d").to_string();
    let events = vec![CalendarEvent {
        start: tomorrow,
        end: None,
        name: "Borrel".to_string(),
        location: "Unknown".to_string(),
    }];

    let summary = RunSummary {
        event_count: events.len(),
        record: StatusRecord::reduce(StatusMode::Today, events, now),
        output_path: PathBuf::from("borrel_status.json"),
    };

    let message = summary.message().unwrap();
    assert!(message.starts_with("Found 1 events.\n"));
    assert!(message.contains("\"borrel_today\": false"));
    assert!(message.contains("\"borrel_days\": 1"));
}

/// A failed run is reported as one "Error: " line carrying the error text
#[test]
fn test_report_failure() {
    let printed = report(Err(env_error("GOOGLE_CALENDAR_ID")));
    assert!(printed.starts_with("Error: Configuration error: GOOGLE_CALENDAR_ID is not set"));
    assert!(!printed.contains('\n'));

    let printed = report(Err(Error::GoogleCalendar("HTTP 403 Forbidden".to_string())));
    assert_eq!(printed, "Error: Google Calendar API error: HTTP 403 Forbidden");
}

/// A successful run is reported with its summary message
#[test]
fn test_report_success() {
    let summary = RunSummary {
        event_count: 2,
        record: StatusRecord::Events {
            updated_at: "2024-06-01T10:00:00+00:00".to_string(),
            events: vec![],
        },
        output_path: PathBuf::from("borrel_status.json"),
    };
    assert_eq!(report(Ok(summary)), "Found 2 events.");
}
