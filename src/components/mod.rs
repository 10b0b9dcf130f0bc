// Pipeline stages
pub mod google_calendar;
pub mod status;

pub use google_calendar::{CalendarEvent, CalendarProvider, GoogleCalendarClient};
pub use status::{StatusMode, StatusRecord};
