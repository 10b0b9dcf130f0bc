use crate::config::Config;
use crate::error::{credentials_error, env_error, BotResult};
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The only scope this crate ever asks for
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";
/// Token endpoint used when the key file does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Google service account key, as downloaded from the cloud console
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Authenticated context for the calendar provider
#[derive(Clone)]
pub struct Credentials {
    key: ServiceAccountKey,
    scopes: Vec<String>,
    encoding_key: EncodingKey,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl Credentials {
    /// Build read-only calendar credentials from a parsed key
    pub fn from_key(key: ServiceAccountKey) -> BotResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            credentials_error(&format!(
                "Invalid private key for {}: {}",
                key.client_email, e
            ))
        })?;

        Ok(Self {
            key,
            scopes: vec![CALENDAR_READONLY_SCOPE.to_string()],
            encoding_key,
        })
    }

    /// Build credentials from service account info given inline as JSON
    pub fn from_info(info: serde_json::Value) -> BotResult<Self> {
        let key: ServiceAccountKey = serde_json::from_value(info).map_err(|e| {
            credentials_error(&format!("Inline secret is not a service account key: {}", e))
        })?;
        Self::from_key(key)
    }

    /// Build credentials from a service account key file
    pub fn from_file(path: &Path) -> BotResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            credentials_error(&format!(
                "Cannot read service account file {}: {}",
                path.display(),
                e
            ))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&content).map_err(|e| {
            credentials_error(&format!(
                "Service account file {} is not a valid key: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_key(key)
    }

    /// Interpret a secret value: inline JSON first, otherwise a path
    pub fn from_secret(secret: &str) -> BotResult<Self> {
        match serde_json::from_str::<serde_json::Value>(secret) {
            Ok(info) => {
                debug!("Using inline service account credentials");
                Self::from_info(info)
            }
            Err(_) => {
                let path = expand_home(secret.trim());
                debug!("Using service account file {}", path.display());
                Self::from_file(&path)
            }
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key.private_key_id.as_deref()
    }

    pub fn token_uri(&self) -> &str {
        &self.key.token_uri
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}

/// Identifier of the calendar to read, never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarId(String);

impl CalendarId {
    /// Returns `None` for blank identifiers
    pub fn new(id: &str) -> Option<Self> {
        let id = id.trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the credentials and calendar to read from configuration.
///
/// The calendar id is checked first so a missing id fails before any file is read.
pub fn resolve_credentials(config: &Config) -> BotResult<(Credentials, CalendarId)> {
    let calendar_id = config
        .google_calendar_id
        .as_deref()
        .and_then(CalendarId::new)
        .ok_or_else(|| env_error("GOOGLE_CALENDAR_ID"))?;

    let credentials = Credentials::from_secret(&config.service_account)?;

    Ok((credentials, calendar_id))
}

/// Expand a leading `~` against `$HOME`
pub fn expand_home(path: &str) -> PathBuf {
    expand_home_with(path, env::var("HOME").ok().as_deref())
}

fn expand_home_with(path: &str, home: Option<&str>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => PathBuf::from(home),
        (p, Some(home)) if p.starts_with("~/") => Path::new(home).join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}
