use super::credentials::{CalendarId, Credentials};
use super::models::EventsPage;
use super::token::TokenManager;
use crate::error::{google_calendar_error, BotResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Parameters of the single list-events call
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub calendar_id: CalendarId,
    pub time_min: DateTime<Utc>,
    pub max_results: u32,
}

/// Source of calendar events.
///
/// Implementations return one page only: recurring events expanded into
/// single occurrences and ordered by start time.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn list_events(&self, query: &EventQuery) -> BotResult<EventsPage>;
}

/// Google Calendar v3 REST client authenticated with a service account
#[derive(Clone)]
pub struct GoogleCalendarClient {
    api_base: String,
    client: Client,
    token_manager: TokenManager,
}

impl GoogleCalendarClient {
    pub fn new(credentials: Credentials, api_base: &str) -> Self {
        let client = Client::new();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token_manager: TokenManager::new(credentials, client.clone()),
            client,
        }
    }

    /// URL for `events.list` on one calendar, with the query parameters set
    fn events_url(&self, query: &EventQuery) -> BotResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| google_calendar_error("API base URL cannot have a path"))?
            .pop_if_empty()
            .extend(["calendars", query.calendar_id.as_str(), "events"]);

        url.query_pairs_mut()
            .append_pair(
                "timeMin",
                &query.time_min.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .append_pair("maxResults", &query.max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        Ok(url)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn list_events(&self, query: &EventQuery) -> BotResult<EventsPage> {
        let url = self.events_url(query)?;
        let access_token = self.token_manager.get_token().await?;

        debug!("Fetching events from {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let page: EventsPage = response
            .json()
            .await
            .map_err(|e| {
                google_calendar_error(&format!("Failed to parse events response: {}", e))
            })?;

        if page.next_page_token.is_some() {
            debug!(
                "More than {} events available, only the first page is used",
                query.max_results
            );
        }

        Ok(page)
    }
}
