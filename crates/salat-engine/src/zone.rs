//! Time-zone normalization.
//!
//! Every instant the engine compares lives in one configured IANA zone. The
//! reference clock arrives as `DateTime<Utc>` and is converted exactly once via
//! [`ScheduleZone::to_zoned`]; wall-clock readings ("03:30" on a given date) are
//! turned into instants via [`ScheduleZone::at_wall_clock`]. Naive timestamps
//! never take part in a comparison.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::EngineError;

/// A point in time with an explicit zone interpretation.
pub type ZonedInstant = DateTime<Tz>;

/// The configured schedule zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleZone {
    tz: Tz,
}

impl ScheduleZone {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parse an IANA zone name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTimezone`] when the name is unknown. This is a
    /// startup error; callers should not construct zones per request.
    pub fn parse(name: &str) -> Result<Self, EngineError> {
        name.trim()
            .parse::<Tz>()
            .map(Self::new)
            .map_err(|_| EngineError::InvalidTimezone(format!("'{}'", name)))
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// Express `instant` in this zone. Idempotent: converting an already zoned
    /// instant yields the same wall-clock fields.
    pub fn to_zoned<T: TimeZone>(&self, instant: &DateTime<T>) -> ZonedInstant {
        instant.with_timezone(&self.tz)
    }

    /// Calendar date of `instant` as read on a wall clock in this zone.
    pub fn local_date<T: TimeZone>(&self, instant: &DateTime<T>) -> NaiveDate {
        self.to_zoned(instant).date_naive()
    }

    /// Start of `date` in this zone.
    pub fn zoned_midnight(&self, date: NaiveDate) -> ZonedInstant {
        self.at_wall_clock(date, NaiveTime::MIN)
    }

    /// The instant at which a clock in this zone reads `time` on `date`.
    ///
    /// Ambiguous readings (DST fall-back) resolve to the earlier instant. Readings
    /// inside a DST gap are moved forward past the gap, matching what a wall clock
    /// shows once it has been set forward.
    pub fn at_wall_clock(&self, date: NaiveDate, time: NaiveTime) -> ZonedInstant {
        let naive = date.and_time(time);
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => self.resolve_gap(naive),
        }
    }

    /// Move `instant` by whole calendar days, keeping its wall-clock time.
    pub fn shift_days(&self, instant: &ZonedInstant, days: i64) -> ZonedInstant {
        let local = self.to_zoned(instant);
        let date = local.date_naive() + Duration::days(days);
        self.at_wall_clock(date, local.time())
    }

    /// Interpret a reading that falls inside a DST gap with the offset in force
    /// before the gap, which lands it the gap's length past the reading.
    fn resolve_gap(&self, naive: NaiveDateTime) -> ZonedInstant {
        let before = self
            .tz
            .offset_from_utc_datetime(&(naive - Duration::hours(24)))
            .fix()
            .local_minus_utc();
        let utc = naive - Duration::seconds(i64::from(before));
        Utc.from_utc_datetime(&utc).with_timezone(&self.tz)
    }
}

impl FromStr for ScheduleZone {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScheduleZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
