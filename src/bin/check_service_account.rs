//! Checks that the configured service account can read the calendar.
//!
//! Usage: `check_service_account [TIME_MIN]`, where `TIME_MIN` is an RFC 3339
//! timestamp (default `2024-01-01T00:00:00Z`).

use borrel_status::components::google_calendar::{
    fetch_events, resolve_credentials, FetchOptions, GoogleCalendarClient,
};
use borrel_status::config::Config;
use borrel_status::error::{config_error, BotResult};
use chrono::{DateTime, Utc};

const DEFAULT_TIME_MIN: &str = "2024-01-01T00:00:00Z";
const MAX_RESULTS: u32 = 10;

#[tokio::main]
async fn main() -> BotResult<()> {
    // Load configuration
    let config = Config::load()?;

    let time_min = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_TIME_MIN.to_string());
    let time_min = DateTime::parse_from_rfc3339(&time_min)
        .map_err(|e| config_error(&format!("Invalid TIME_MIN '{}': {}", time_min, e)))?
        .with_timezone(&Utc);

    let (credentials, calendar_id) = resolve_credentials(&config)?;
    println!("Authenticated as {}", credentials.client_email());

    let client = GoogleCalendarClient::new(credentials, &config.api_base);
    let options = FetchOptions {
        max_results: MAX_RESULTS,
        time_min: Some(time_min),
        ..FetchOptions::from_config(&config)
    };

    let events = fetch_events(&client, &calendar_id, &options).await?;

    println!("Found {} events.", events.len());
    for event in events {
        println!("{} - {}", event.start, event.name);
    }

    Ok(())
}
