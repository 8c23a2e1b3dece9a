//! The day's schedule: parsed entries anchored to one calendar date.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;

use crate::date_parser::{anchor_date, DateProvenance};
use crate::error::EngineError;
use crate::extract::RawSchedule;
use crate::prayer::{NamedTime, PrayerName};
use crate::time_parser::parse_time;
use crate::zone::ScheduleZone;

/// One day's parsed schedule.
///
/// Entries are chronological and hold at most one entry per name. All
/// instants are anchored to `calendar_date` in the schedule zone. Built once
/// per fetch and never mutated, so it can be shared freely between readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySchedule {
    pub calendar_date: NaiveDate,
    entries: Vec<NamedTime>,
    pub provenance: DateProvenance,
    /// Hijri date text as shown by the source, if any.
    pub hijri_date: Option<String>,
}

impl DailySchedule {
    /// Build a schedule from already-parsed entries.
    ///
    /// Entries are sorted chronologically; a repeated name keeps its first
    /// occurrence.
    pub fn new(
        calendar_date: NaiveDate,
        entries: Vec<NamedTime>,
        provenance: DateProvenance,
    ) -> Self {
        let mut unique: Vec<NamedTime> = Vec::with_capacity(entries.len());
        for entry in entries {
            if unique.iter().any(|e| e.name == entry.name) {
                warn!("duplicate {} entry '{}' ignored", entry.name, entry.display_time);
                continue;
            }
            unique.push(entry);
        }
        unique.sort_by_key(|e| e.instant);

        Self {
            calendar_date,
            entries: unique,
            provenance,
            hijri_date: None,
        }
    }

    pub fn with_hijri_date(mut self, hijri_date: Option<String>) -> Self {
        self.hijri_date = hijri_date;
        self
    }

    /// All entries, Sunrise included, in chronological order.
    pub fn entries(&self) -> &[NamedTime] {
        &self.entries
    }

    /// The five ritual prayers present, in chronological order.
    pub fn ritual_entries(&self) -> impl Iterator<Item = &NamedTime> {
        self.entries.iter().filter(|e| e.name.is_ritual())
    }

    pub fn get(&self, name: PrayerName) -> Option<&NamedTime> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn is_stale(&self) -> bool {
        self.provenance.is_stale()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Build a [`DailySchedule`] from extracted source data.
///
/// The anchor date is always `today` (the viewer's date in `zone`); the
/// source's own date text only decides staleness. Malformed entries and
/// unknown names are skipped individually.
///
/// # Errors
///
/// Returns [`EngineError::EmptySchedule`] when no entry survives parsing.
pub fn build_schedule<S: AsRef<str>>(
    raw: &RawSchedule,
    today: NaiveDate,
    zone: &ScheduleZone,
    date_formats: &[S],
) -> Result<DailySchedule, EngineError> {
    let anchor = anchor_date(raw.date_text.as_deref(), today, date_formats);

    let mut entries = Vec::with_capacity(raw.entries.len());
    for (name_text, time_text) in &raw.entries {
        let name = match name_text.parse::<PrayerName>() {
            Ok(name) => name,
            Err(e) => {
                warn!("skipping entry: {}", e);
                continue;
            }
        };
        let Some(instant) = parse_time(time_text, anchor.date, zone) else {
            continue;
        };
        debug!("parsed {} at {} as {}", name, time_text.trim(), instant.to_rfc3339());
        entries.push(NamedTime::new(name, time_text.trim(), instant));
    }

    if entries.is_empty() {
        return Err(EngineError::EmptySchedule(format!(
            "none of {} extracted entries could be parsed",
            raw.entries.len()
        )));
    }

    Ok(DailySchedule::new(anchor.date, entries, anchor.provenance)
        .with_hijri_date(raw.hijri_date.clone()))
}
