use serde::{Deserialize, Serialize};

/// Name used when an event has no summary
pub const DEFAULT_EVENT_NAME: &str = "Unnamed Event";
/// Location used when an event has none
pub const DEFAULT_EVENT_LOCATION: &str = "Unknown";

/// Start or end of an event as returned by the Calendar API
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// RFC 3339 timestamp for timed events
    pub date_time: Option<String>,
    /// `YYYY-MM-DD` for all-day events
    pub date: Option<String>,
}

impl EventDateTime {
    /// Precise timestamp if present, otherwise the date
    pub fn value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// One item of an `events.list` response, only the fields we read
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: Option<EventDateTime>,
}

/// Body of an `events.list` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<RawEvent>,
    pub next_page_token: Option<String>,
}

/// Simplified calendar event representation, as written to the status file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: String,
    pub end: Option<String>,
    pub name: String,
    pub location: String,
}

impl From<RawEvent> for CalendarEvent {
    fn from(raw: RawEvent) -> Self {
        CalendarEvent {
            start: raw.start.value().unwrap_or_default().to_string(),
            end: raw.end.as_ref().and_then(|end| end.value()).map(str::to_string),
            name: raw.summary.unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string()),
            location: raw
                .location
                .unwrap_or_else(|| DEFAULT_EVENT_LOCATION.to_string()),
        }
    }
}
