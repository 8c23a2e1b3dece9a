//! Synthetic schedule returned when the real one cannot be produced.
//!
//! The fallback lists one approximate time per slot, anchored to the viewer's
//! date in the schedule zone, with no current or next prayer and the reason
//! attached. It never panics: formatting problems degrade to placeholders.

use chrono::{DateTime, TimeZone};
use log::error;

use crate::payload::{format_date, PrayerTimesPayload, TimeEntry, DATE_PLACEHOLDER};
use crate::prayer::PrayerName;
use crate::time_parser::{format_clock, parse_time};
use crate::zone::ScheduleZone;

/// Approximate times for a mid-latitude summer day, one per slot.
pub const FALLBACK_TIMES: [(PrayerName, &str); 6] = [
    (PrayerName::Fajr, "03:30 AM"),
    (PrayerName::Sunrise, "05:30 AM"),
    (PrayerName::Dhuhr, "01:15 PM"),
    (PrayerName::Asr, "05:30 PM"),
    (PrayerName::Maghrib, "09:15 PM"),
    (PrayerName::Isha, "10:45 PM"),
];

/// Shown for a fallback slot whose time cannot be rendered.
pub const TIME_PLACEHOLDER: &str = "N/A";

/// Build the fallback payload for `reason` at reference instant `now`.
pub fn build_fallback<T: TimeZone>(
    reason: &str,
    now: &DateTime<T>,
    zone: &ScheduleZone,
    display_date_format: &str,
) -> PrayerTimesPayload {
    error!("serving fallback schedule: {}", reason);

    let today = zone.local_date(now);
    let date = format_date(today, display_date_format).unwrap_or_else(|| DATE_PLACEHOLDER.to_string());

    let times = FALLBACK_TIMES
        .iter()
        .map(|(name, reading)| TimeEntry {
            name: name.to_string(),
            time: parse_time(reading, today, zone)
                .map(|dt| format_clock(&dt))
                .unwrap_or_else(|| TIME_PLACEHOLDER.to_string()),
        })
        .collect();

    PrayerTimesPayload {
        date: format!("Error: {date}"),
        hijri_date: None,
        times,
        current_prayer: None,
        next_prayer: None,
        is_stale: false,
        error: Some(reason.to_string()),
    }
}
