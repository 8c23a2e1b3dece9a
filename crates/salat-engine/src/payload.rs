//! The JSON shape handed to presentation code.
//!
//! Every request produces one of these, including degraded ones: fallback and
//! stale data are told apart by `isStale` and `error`, never by missing fields.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::date_parser::DateProvenance;
use crate::schedule::DailySchedule;
use crate::status::{CurrentSlot, NextSlot, ScheduleStatus};

/// Shown when the display date cannot be formatted.
pub const DATE_PLACEHOLDER: &str = "Date Unavailable (Formatting Error)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerTimesPayload {
    pub date: String,
    pub hijri_date: Option<String>,
    pub times: Vec<TimeEntry>,
    pub current_prayer: Option<CurrentPrayer>,
    pub next_prayer: Option<NextPrayer>,
    pub is_stale: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeEntry {
    pub name: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentPrayer {
    pub name: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPrayer {
    pub name: String,
    pub time: String,
    pub eta_minutes: i64,
    /// RFC 3339 with the schedule zone's offset.
    pub instant: String,
    pub time_until: String,
    pub is_tomorrow: bool,
}

impl From<&CurrentSlot> for CurrentPrayer {
    fn from(slot: &CurrentSlot) -> Self {
        Self {
            name: slot.name.to_string(),
            time: slot.display_time.clone(),
        }
    }
}

impl From<&NextSlot> for NextPrayer {
    fn from(slot: &NextSlot) -> Self {
        Self {
            name: slot.name.to_string(),
            time: slot.display_time.clone(),
            eta_minutes: slot.eta_minutes,
            instant: slot.instant.to_rfc3339(),
            time_until: slot.time_until(),
            is_tomorrow: slot.is_tomorrow,
        }
    }
}

impl PrayerTimesPayload {
    /// Combine a resolved schedule and its status.
    pub fn from_schedule(
        schedule: &DailySchedule,
        status: &ScheduleStatus,
        display_date_format: &str,
    ) -> Self {
        Self {
            date: display_date(schedule.calendar_date, schedule.provenance, display_date_format),
            hijri_date: schedule.hijri_date.clone(),
            times: schedule
                .entries()
                .iter()
                .map(|e| TimeEntry {
                    name: e.name.to_string(),
                    time: e.display_time.clone(),
                })
                .collect(),
            current_prayer: status.current.as_ref().map(CurrentPrayer::from),
            next_prayer: status.next.as_ref().map(NextPrayer::from),
            is_stale: schedule.is_stale(),
            error: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Format `date` with `pattern`, or `None` if the pattern cannot be rendered.
pub fn format_date(date: NaiveDate, pattern: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(pattern)).ok()?;
    Some(out)
}

/// The payload's `date` string, annotated with how the date was established.
pub fn display_date(date: NaiveDate, provenance: DateProvenance, pattern: &str) -> String {
    let Some(formatted) = format_date(date, pattern) else {
        return DATE_PLACEHOLDER.to_string();
    };
    match provenance {
        DateProvenance::Current => formatted,
        DateProvenance::Missing => format!("{formatted} (Date Unavailable)"),
        DateProvenance::Stale { scraped } => {
            let shown = format_date(scraped, "%-d. %b").unwrap_or_else(|| scraped.to_string());
            format!("{formatted} (Data for {shown})")
        }
        DateProvenance::Unparsed => format!("{formatted} (Scraped Date Invalid)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const FORMAT: &str = "%A, %-d. %b %Y";

    #[test]
    fn test_display_current() {
        assert_eq!(
            display_date(ymd(2025, 6, 1), DateProvenance::Current, FORMAT),
            "Sunday, 1. Jun 2025"
        );
    }

    #[test]
    fn test_display_stale() {
        let provenance = DateProvenance::Stale {
            scraped: ymd(2025, 6, 1),
        };
        assert_eq!(
            display_date(ymd(2025, 6, 2), provenance, FORMAT),
            "Monday, 2. Jun 2025 (Data for 1. Jun)"
        );
    }

    #[test]
    fn test_display_unparsed() {
        assert_eq!(
            display_date(ymd(2025, 6, 2), DateProvenance::Unparsed, FORMAT),
            "Monday, 2. Jun 2025 (Scraped Date Invalid)"
        );
    }

    #[test]
    fn test_display_missing_is_annotated() {
        assert_eq!(
            display_date(ymd(2025, 6, 2), DateProvenance::Missing, FORMAT),
            "Monday, 2. Jun 2025 (Date Unavailable)"
        );
    }

    #[test]
    fn test_display_bad_pattern_degrades_to_placeholder() {
        // %Q is not a chrono specifier
        assert_eq!(
            display_date(ymd(2025, 6, 2), DateProvenance::Current, "%Q"),
            DATE_PLACEHOLDER
        );
    }

    #[test]
    fn test_payload_field_names() {
        let payload = PrayerTimesPayload {
            date: "d".to_string(),
            hijri_date: None,
            times: vec![],
            current_prayer: None,
            next_prayer: None,
            is_stale: false,
            error: Some("boom".to_string()),
        };
        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        for key in [
            "date",
            "hijriDate",
            "times",
            "currentPrayer",
            "nextPrayer",
            "isStale",
            "error",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["currentPrayer"].is_null());
        assert!(payload.is_fallback());
    }
}
