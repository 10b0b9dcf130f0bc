use crate::components::status::StatusMode;
use crate::error::{config_error, BotResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Secret used when `GOOGLE_SERVICE_ACCOUNT_JSON` is not set
pub const DEFAULT_SERVICE_ACCOUNT: &str = "~/.secrets/borrel-calendar-9c562381bf19.json";
/// File the status record is written to
pub const DEFAULT_OUTPUT_PATH: &str = "borrel_status.json";
/// Cap on the number of events requested from the calendar
pub const DEFAULT_MAX_RESULTS: u32 = 50;
/// Timezone used to decide what "today" is
pub const DEFAULT_TIMEZONE: &str = "Europe/Amsterdam";
/// Parsed form of `DEFAULT_TIMEZONE`
pub const DEFAULT_TZ: Tz = chrono_tz::Europe::Amsterdam;
/// Root of the Google Calendar v3 REST API
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
/// Optional TOML file with non-secret settings
pub const DEFAULT_CONFIG_FILE: &str = "config/borrel.toml";

/// Google allows at most this many events per page
const MAX_RESULTS_LIMIT: u32 = 2500;
/// Largest accepted `BORREL_LOOKBACK_DAYS`, ten years
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

/// Main configuration structure, built once at startup and passed down
#[derive(Debug, Clone)]
pub struct Config {
    /// Inline service account JSON or a path to it
    pub service_account: String,
    /// Google Calendar ID to read; checked when credentials are resolved
    pub google_calendar_id: Option<String>,
    /// Which status record to produce
    pub mode: StatusMode,
    /// Where the status record is written
    pub output_path: PathBuf,
    /// Maximum number of events in the single list call
    pub max_results: u32,
    /// Lower time bound is "now" minus this many days
    pub lookback_days: i64,
    /// Timezone for day calculations
    pub timezone: Tz,
    /// Google Calendar API root, overridable for tests
    pub api_base: String,
}

/// Settings that may come from the optional TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    mode: Option<String>,
    output_path: Option<String>,
    max_results: Option<u32>,
    lookback_days: Option<i64>,
    timezone: Option<String>,
    api_base: Option<String>,
}

impl FileConfig {
    fn load(path: &Path, required: bool) -> BotResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loading settings from {}", path.display());
                Ok(toml::from_str(&content)?)
            }
            Err(_) if !required => Ok(Self::default()),
            Err(e) => Err(config_error(&format!(
                "Cannot read config file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the process environment and the optional config file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    ///
    /// Precedence is defaults, then the TOML file named by `BORREL_CONFIG`
    /// (default `config/borrel.toml`, skipped when absent), then the lookup itself.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let file = match get("BORREL_CONFIG") {
            Some(path) => FileConfig::load(Path::new(&path), true)?,
            None => FileConfig::load(Path::new(DEFAULT_CONFIG_FILE), false)?,
        };

        let service_account = get("GOOGLE_SERVICE_ACCOUNT_JSON")
            .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT.to_string());
        let google_calendar_id = get("GOOGLE_CALENDAR_ID").map(|id| id.trim().to_string());

        let mode = match get("BORREL_STATUS_MODE").or(file.mode) {
            Some(mode) => mode.parse::<StatusMode>()?,
            None => StatusMode::default(),
        };

        let output_path: PathBuf = get("BORREL_OUTPUT_PATH")
            .or(file.output_path)
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string())
            .into();

        let max_results = match get("BORREL_MAX_RESULTS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| config_error("Invalid BORREL_MAX_RESULTS format"))?,
            None => file.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
        };
        if max_results == 0 || max_results > MAX_RESULTS_LIMIT {
            return Err(config_error(&format!(
                "BORREL_MAX_RESULTS must be between 1 and {}, got {}",
                MAX_RESULTS_LIMIT, max_results
            )));
        }

        let lookback_days = match get("BORREL_LOOKBACK_DAYS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| config_error("Invalid BORREL_LOOKBACK_DAYS format"))?,
            None => file.lookback_days.unwrap_or(0),
        };
        if lookback_days < 0 {
            return Err(config_error("BORREL_LOOKBACK_DAYS cannot be negative"));
        }
        if lookback_days > MAX_LOOKBACK_DAYS {
            return Err(config_error(&format!(
                "BORREL_LOOKBACK_DAYS must be at most {}, got {}",
                MAX_LOOKBACK_DAYS, lookback_days
            )));
        }

        let timezone = match get("TIMEZONE").or(file.timezone) {
            Some(name) => crate::utils::time::parse_timezone(&name)?,
            None => DEFAULT_TZ,
        };

        let api_base = get("GOOGLE_CALENDAR_API_BASE")
            .or(file.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            service_account,
            google_calendar_id,
            mode,
            output_path,
            max_results,
            lookback_days,
            timezone,
            api_base,
        })
    }
}
