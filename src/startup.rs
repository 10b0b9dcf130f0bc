use crate::components::google_calendar::{
    fetch_events, resolve_credentials, CalendarId, CalendarProvider, FetchOptions,
    GoogleCalendarClient,
};
use crate::components::status::{write_status, StatusMode, StatusRecord};
use crate::config::Config;
use crate::error::{BotResult, Error};
use crate::utils::time::now_in;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Config(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub event_count: usize,
    pub record: StatusRecord,
    pub output_path: PathBuf,
}

impl RunSummary {
    /// Human-readable result printed on success
    pub fn message(&self) -> BotResult<String> {
        let mut message = format!("Found {} events.", self.event_count);
        if self.record.mode() != StatusMode::Events {
            message.push('\n');
            message.push_str(&serde_json::to_string_pretty(&self.record)?);
        }
        Ok(message)
    }
}

/// Fetch, reduce and write using an already authenticated provider
pub async fn run_with_provider<P>(
    config: &Config,
    provider: &P,
    calendar_id: &CalendarId,
) -> BotResult<RunSummary>
where
    P: CalendarProvider + ?Sized,
{
    let events = fetch_events(provider, calendar_id, &FetchOptions::from_config(config)).await?;
    let event_count = events.len();
    info!("Fetched {} events", event_count);

    let record = StatusRecord::reduce(config.mode, events, now_in(config.timezone));
    write_status(&record, &config.output_path).await?;

    Ok(RunSummary {
        event_count,
        record,
        output_path: config.output_path.clone(),
    })
}

/// Full pipeline: resolve credentials, fetch, reduce, write
pub async fn run_pipeline(config: &Config) -> BotResult<RunSummary> {
    let (credentials, calendar_id) = resolve_credentials(config)?;
    info!(
        "Authenticating as {} to read {}",
        credentials.client_email(),
        calendar_id
    );

    let client = GoogleCalendarClient::new(credentials, &config.api_base);
    run_with_provider(config, &client, &calendar_id).await
}

/// Load configuration and run once, turning the outcome into the printed message.
///
/// Failures never abort the process; they are only visible in the output.
pub async fn run_and_report() -> String {
    let outcome = match Config::load() {
        Ok(config) => run_pipeline(&config).await,
        Err(e) => Err(e),
    };

    report(outcome)
}

/// Turn the outcome of a run into the line printed for the user
pub fn report(outcome: BotResult<RunSummary>) -> String {
    let message = outcome.and_then(|summary| {
        info!("Status written to {}", summary.output_path.display());
        summary.message()
    });

    match message {
        Ok(message) => message,
        Err(e) => {
            error!("Run failed: {:?}", e);
            format!("Error: {}", e)
        }
    }
}
