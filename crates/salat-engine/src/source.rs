//! The source-fetching capability.
//!
//! The engine does not care how page content was obtained (plain HTTP,
//! headless rendering, a file on disk). Implementors perform one blocking
//! fetch bounded by the caller's timeout; retries, if any, belong to the
//! implementor.

use std::time::Duration;

use crate::error::EngineError;

pub trait SourceFetcher {
    /// Fetch the raw schedule page.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SourceUnavailable`] on any transport failure or
    /// when `timeout` elapses.
    fn fetch(&self, timeout: Duration) -> Result<String, EngineError>;

    /// Human-readable description of where content comes from, for logs.
    fn describe(&self) -> String {
        "schedule source".to_string()
    }
}

/// Content that is already in memory (a file, stdin, a test fixture).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSource {
    content: String,
    origin: String,
}

impl StaticSource {
    pub fn new(content: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            origin: origin.into(),
        }
    }
}

impl SourceFetcher for StaticSource {
    fn fetch(&self, _timeout: Duration) -> Result<String, EngineError> {
        Ok(self.content.clone())
    }

    fn describe(&self) -> String {
        self.origin.clone()
    }
}

/// A source that always fails; stands in for an unreachable upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableSource {
    reason: String,
}

impl UnavailableSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SourceFetcher for UnavailableSource {
    fn fetch(&self, _timeout: Duration) -> Result<String, EngineError> {
        Err(EngineError::SourceUnavailable(self.reason.clone()))
    }

    fn describe(&self) -> String {
        "unavailable source".to_string()
    }
}
