//! Error handling for the application

use thiserror::Error;

/// Fetch-related errors
///
/// One cycle either yields a usable response or fails as a whole;
/// there are no partial results.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Http(u16),

    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Http(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Configuration and persisted-state errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(String),

    #[error("Unparseable config data: {0}")]
    Corrupt(String),
}

/// User-input validation errors
#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Instrument id has invalid format: {0}")]
    BadInstrumentFormat(String),

    #[error("Polling interval too short: {0}s")]
    BadInterval(u64),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::FetchError(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}
