//! The resolution pipeline.
//!
//! raw content → extraction → date anchoring + time parsing → [`DailySchedule`]
//! → [`ScheduleStatus`] → [`PrayerTimesPayload`].
//!
//! Any failure on the way (unreachable source, nothing parseable, a panic in
//! a parsing dependency) produces the fallback payload instead of partial
//! data. Only configuration errors, raised when building [`EngineConfig`], are
//! allowed to stop the process.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use log::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::extract::{extract_schedule, RawSchedule};
use crate::fallback::build_fallback;
use crate::payload::PrayerTimesPayload;
use crate::schedule::{self, DailySchedule};
use crate::source::SourceFetcher;
use crate::status::{resolve_status, ScheduleStatus};

/// Stateless apart from its configuration; one instance serves every request.
#[derive(Debug, Clone)]
pub struct ScheduleEngine {
    config: EngineConfig,
}

impl ScheduleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse extracted data into a schedule anchored to `now`'s date in the
    /// configured zone.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptySchedule`] when no entry can be parsed.
    pub fn build_schedule<T: TimeZone>(
        &self,
        raw: &RawSchedule,
        now: &DateTime<T>,
    ) -> Result<DailySchedule, EngineError> {
        let today = self.config.zone.local_date(now);
        schedule::build_schedule(raw, today, &self.config.zone, &self.config.date_formats)
    }

    /// Current and next prayer for `now`.
    pub fn status<T: TimeZone>(&self, schedule: &DailySchedule, now: &DateTime<T>) -> ScheduleStatus {
        resolve_status(schedule, now, &self.config.zone, &self.config.status)
    }

    /// Resolve extracted data into a payload, falling back on failure.
    pub fn resolve<T: TimeZone>(&self, raw: &RawSchedule, now: &DateTime<T>) -> PrayerTimesPayload {
        match self.build_schedule(raw, now) {
            Ok(schedule) => {
                let status = self.status(&schedule, now);
                debug!(
                    "resolved {} entries for {}: current={:?} next={:?}",
                    schedule.len(),
                    schedule.calendar_date,
                    status.current.as_ref().map(|c| c.name),
                    status.next.as_ref().map(|n| n.label())
                );
                PrayerTimesPayload::from_schedule(&schedule, &status, &self.config.display_date_format)
            }
            Err(e) => self.fallback(&e.to_string(), now),
        }
    }

    /// Resolve already-fetched page content.
    pub fn resolve_content<T: TimeZone>(&self, content: &str, now: &DateTime<T>) -> PrayerTimesPayload {
        let raw = extract_schedule(content);
        if raw.entries.is_empty() {
            return self.fallback("Failed to find prayer times in the source content.", now);
        }
        self.resolve(&raw, now)
    }

    /// Fetch, extract and resolve. Never panics and never returns partial data.
    pub fn run<T: TimeZone>(
        &self,
        fetcher: &dyn SourceFetcher,
        timeout: Duration,
        now: &DateTime<T>,
    ) -> PrayerTimesPayload {
        info!("fetching schedule from {}", fetcher.describe());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let content = fetcher.fetch(timeout)?;
            Ok::<_, EngineError>(self.resolve_content(&content, now))
        }));

        match outcome {
            Ok(Ok(payload)) => payload,
            Ok(Err(e)) => self.fallback(&e.to_string(), now),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                self.fallback(&format!("An unexpected error occurred: {message}"), now)
            }
        }
    }

    /// The fallback payload for `reason` at `now`.
    pub fn fallback<T: TimeZone>(&self, reason: &str, now: &DateTime<T>) -> PrayerTimesPayload {
        build_fallback(reason, now, &self.config.zone, &self.config.display_date_format)
    }
}
