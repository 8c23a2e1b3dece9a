//! Parsing of schedule clock readings.
//!
//! Sources publish 24-hour `"HH:MM"` readings. A 12-hour `"HH:MM AM"` /
//! `"HH:MM PM"` form is accepted as well for the built-in fallback schedule and
//! legacy inputs. Anything else is rejected with `None`: a malformed reading
//! drops that one entry, never the whole schedule.

use chrono::{NaiveDate, NaiveTime};
use log::warn;

use crate::error::EngineError;
use crate::zone::{ScheduleZone, ZonedInstant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Parse a clock reading into a wall-clock time with seconds zeroed.
///
/// 24-hour readings need hour in `0..=23`; 12-hour readings need hour in
/// `1..=12`. Minutes are always `0..=59`.
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    let (clock, meridiem) = split_meridiem(text)?;

    let (hours_str, minutes_str) = clock.split_once(':')?;
    let hours = parse_component(hours_str)?;
    let minutes = parse_component(minutes_str)?;

    if minutes > 59 {
        return None;
    }

    let hours = match meridiem {
        None if hours <= 23 => hours,
        None => return None,
        Some(_) if !(1..=12).contains(&hours) => return None,
        Some(Meridiem::Pm) if hours < 12 => hours + 12,
        Some(Meridiem::Am) if hours == 12 => 0,
        Some(_) => hours,
    };

    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Parse `text` as a clock reading on `anchor_date` in `zone`.
///
/// Returns `None` (and logs a warning) when the reading is malformed.
pub fn parse_time(text: &str, anchor_date: NaiveDate, zone: &ScheduleZone) -> Option<ZonedInstant> {
    match parse_clock(text) {
        Some(time) => Some(zone.at_wall_clock(anchor_date, time)),
        None => {
            let err = EngineError::InvalidTime(format!("'{}' on {}", text.trim(), anchor_date));
            warn!("skipping entry: {}", err);
            None
        }
    }
}

/// Format a wall-clock reading the way sources publish it.
pub fn format_clock(instant: &ZonedInstant) -> String {
    instant.format("%H:%M").to_string()
}

fn split_meridiem(text: &str) -> Option<(&str, Option<Meridiem>)> {
    let upper = text.to_ascii_uppercase();
    let meridiem = if upper.ends_with("AM") {
        Meridiem::Am
    } else if upper.ends_with("PM") {
        Meridiem::Pm
    } else if text.contains(char::is_whitespace) {
        return None;
    } else {
        return Some((text, None));
    };
    Some((text[..text.len() - 2].trim_end(), Some(meridiem)))
}

/// One or two ASCII digits.
fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ── Tests ───────────────────────────────────────────────────────────────────
