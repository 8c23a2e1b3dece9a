//! Startup configuration.
//!
//! Built once when the service starts. Construction validates everything that
//! could otherwise fail per request, so an unusable zone or pattern list halts
//! startup instead of degrading every query.

use chrono::Duration;

use crate::date_parser::DEFAULT_DATE_FORMATS;
use crate::error::EngineError;
use crate::status::StatusPolicy;
use crate::zone::ScheduleZone;

/// Default display format for the schedule date, e.g. `"Sunday, 1. Jun 2025"`.
pub const DEFAULT_DISPLAY_DATE_FORMAT: &str = "%A, %-d. %b %Y";

/// Default zone used by the bundled CLI.
pub const DEFAULT_ZONE: &str = "Europe/Berlin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub zone: ScheduleZone,
    /// Ordered `chrono` strftime patterns for the displayed date.
    pub date_formats: Vec<String>,
    /// `chrono` strftime pattern for the payload's `date` string.
    pub display_date_format: String,
    pub status: StatusPolicy,
}

impl EngineConfig {
    /// Configuration for `zone_id` with default patterns and policy.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTimezone`] if `zone_id` is not an IANA zone.
    pub fn new(zone_id: &str) -> Result<Self, EngineError> {
        Ok(Self {
            zone: ScheduleZone::parse(zone_id)?,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            display_date_format: DEFAULT_DISPLAY_DATE_FORMAT.to_string(),
            status: StatusPolicy::default(),
        })
    }

    /// Replace the date pattern list.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the list is empty or a pattern is blank.
    pub fn with_date_formats<I, S>(mut self, formats: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let formats: Vec<String> = formats.into_iter().map(Into::into).collect();
        if formats.is_empty() {
            return Err(EngineError::Config(
                "at least one date format is required".to_string(),
            ));
        }
        if let Some(blank) = formats.iter().position(|f| f.trim().is_empty()) {
            return Err(EngineError::Config(format!(
                "date format #{} is blank",
                blank + 1
            )));
        }
        self.date_formats = formats;
        Ok(self)
    }

    pub fn with_display_date_format(mut self, format: impl Into<String>) -> Self {
        self.display_date_format = format.into();
        self
    }

    /// Set how long a last non-Isha prayer stays current.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] unless `minutes` lies in
    /// `1..=StatusPolicy::MAX_WINDOW_MINUTES`.
    pub fn with_open_window_minutes(self, minutes: i64) -> Result<Self, EngineError> {
        if !(1..=StatusPolicy::MAX_WINDOW_MINUTES).contains(&minutes) {
            return Err(EngineError::Config(format!(
                "open window must be between 1 and {} minutes, got {minutes}",
                StatusPolicy::MAX_WINDOW_MINUTES
            )));
        }
        let policy = StatusPolicy {
            open_window: Duration::minutes(minutes),
            ..self.status
        };
        self.with_status_policy(policy)
    }

    /// Replace the status policy.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if either window is out of range.
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Result<Self, EngineError> {
        policy.validate()?;
        self.status = policy;
        Ok(self)
    }
}
