//! Google Calendar access: service account credentials, tokens, and the list-events call.

pub mod client;
pub mod credentials;
pub mod events;
pub mod models;
pub mod time;
pub mod token;

pub use client::{CalendarProvider, EventQuery, GoogleCalendarClient};
pub use credentials::{resolve_credentials, CalendarId, Credentials};
pub use events::{fetch_events, FetchOptions};
pub use models::CalendarEvent;
