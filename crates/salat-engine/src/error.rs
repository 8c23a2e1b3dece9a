//! Error types for salat-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Empty schedule: {0}")]
    EmptySchedule(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    /// Whether this error must halt startup rather than degrade a single request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::InvalidTimezone(_) | EngineError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
