//! Parsing of the free-text calendar date shown on a schedule page.
//!
//! The page format is not contractually fixed and has changed over time
//! (`"Sunday 1 Jun 2025"`, `"1 June 2025"`, `"2025-06-01"`, ...). Parsing tries an
//! ordered list of `chrono` strftime patterns and returns the first match. The
//! parsed date is then compared with the viewer's date in the schedule zone:
//! prayer times are always anchored to the viewer's date, and a mismatching
//! source is flagged stale.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;

use crate::error::EngineError;

/// Patterns tried when the configuration does not override them, in order.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%A %d %b %Y",
    "%d %b %Y",
    "%A %B %d %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
];

/// A successful parse and the pattern that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDate {
    pub date: NaiveDate,
    pub pattern: String,
}

/// Parse a displayed date using [`DEFAULT_DATE_FORMATS`].
///
/// # Errors
///
/// Returns [`EngineError::InvalidDate`] when no pattern yields a valid date.
pub fn parse_displayed_date(text: &str) -> Result<ParsedDate, EngineError> {
    parse_displayed_date_with(text, DEFAULT_DATE_FORMATS)
}

/// Parse a displayed date, trying `patterns` in order.
///
/// Each pattern is tried against the trimmed text, then against the text with
/// `.` and `,` removed, then against that with its leading word dropped (which
/// tolerates a weekday prefix the pattern does not name).
///
/// # Errors
///
/// Returns [`EngineError::InvalidDate`] when every attempt fails.
pub fn parse_displayed_date_with<S: AsRef<str>>(
    text: &str,
    patterns: &[S],
) -> Result<ParsedDate, EngineError> {
    let raw = collapse_whitespace(text);
    if raw.is_empty() {
        return Err(EngineError::InvalidDate("empty date text".to_string()));
    }

    let cleaned = collapse_whitespace(&raw.replace(['.', ','], " "));
    let without_lead = cleaned
        .split_once(' ')
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_default();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let candidates = [raw.as_str(), cleaned.as_str(), without_lead.as_str()];
        for candidate in candidates.iter().filter(|c| !c.is_empty()) {
            if let Ok(date) = NaiveDate::parse_from_str(candidate, pattern) {
                debug!("date text '{}' matched pattern '{}' as {}", raw, pattern, date);
                return Ok(ParsedDate {
                    date,
                    pattern: pattern.to_string(),
                });
            }
        }
    }

    warn!("date text '{}' matched none of {} patterns", raw, patterns.len());
    Err(EngineError::InvalidDate(format!(
        "no known format matches '{}'",
        raw
    )))
}

/// How the schedule's calendar date was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DateProvenance {
    /// The source's date matched the viewer's date.
    Current,
    /// The source showed a different day; times were re-anchored to today.
    Stale { scraped: NaiveDate },
    /// The source's date text could not be parsed; today's date was assumed.
    Unparsed,
    /// The source showed no date at all; today's date was assumed.
    Missing,
}

impl DateProvenance {
    pub fn is_stale(self) -> bool {
        matches!(self, DateProvenance::Stale { .. })
    }

    /// Whether the date is a best-effort reconstruction rather than read from the source.
    pub fn is_reconstructed(self) -> bool {
        matches!(self, DateProvenance::Unparsed | DateProvenance::Missing)
    }
}

/// The date schedule entries get anchored to, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateAnchor {
    pub date: NaiveDate,
    pub provenance: DateProvenance,
}

/// Decide the anchor date from the source's date text and the viewer's date.
///
/// The anchor is always `today`; the source's own date only determines the
/// provenance. Never anchors to a day other than the viewer's.
pub fn anchor_date<S: AsRef<str>>(
    date_text: Option<&str>,
    today: NaiveDate,
    patterns: &[S],
) -> DateAnchor {
    let provenance = match date_text.map(str::trim).filter(|t| !t.is_empty()) {
        None => {
            warn!("source shows no calendar date; assuming {}", today);
            DateProvenance::Missing
        }
        Some(text) => match parse_displayed_date_with(text, patterns) {
            Ok(parsed) if parsed.date == today => DateProvenance::Current,
            Ok(parsed) => {
                warn!(
                    "stale source: shows {} but today is {}; anchoring to today",
                    parsed.date, today
                );
                DateProvenance::Stale {
                    scraped: parsed.date,
                }
            }
            Err(_) => {
                warn!("unparseable source date '{}'; assuming {}", text, today);
                DateProvenance::Unparsed
            }
        },
    };

    DateAnchor {
        date: today,
        provenance,
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ───────────────────────────────────────────────────────────────────
