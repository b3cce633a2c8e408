use thiserror::Error;

/// Errors raised at the fallible edges of the guard: loading and validating
/// configuration, and parsing operator input. The decisions themselves never fail.
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid schedule '{schedule}': {reason}")]
    InvalidSchedule { schedule: String, reason: String },

    #[error("Invalid content rule: {0}")]
    InvalidRule(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for GuardError {
    fn from(err: toml::de::Error) -> Self {
        GuardError::Config(err.to_string())
    }
}

impl From<config::ConfigError> for GuardError {
    fn from(err: config::ConfigError) -> Self {
        GuardError::Config(err.to_string())
    }
}

impl From<regex::Error> for GuardError {
    fn from(err: regex::Error) -> Self {
        GuardError::InvalidRule(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;
