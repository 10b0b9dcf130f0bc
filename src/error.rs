use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(borrel::config))]
    Config(String),

    #[error("Credential error: {0}")]
    #[diagnostic(code(borrel::credentials))]
    Credentials(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(borrel::google_calendar))]
    GoogleCalendar(String),

    #[error(transparent)]
    #[diagnostic(code(borrel::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(borrel::serialization))]
    Serialization(String),
}

// Implement From for JSON errors on the status file
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create errors for missing environment variables
pub fn env_error(var: &str) -> Error {
    Error::Config(format!(
        "{} is not set. Make sure it's in the .env file or the job's secrets.",
        var
    ))
}

/// Helper to create credential errors
pub fn credentials_error(message: &str) -> Error {
    Error::Credentials(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}
