//! Best-effort extraction of a day's schedule from fetched page content.
//!
//! Two strategies, tried in order:
//! - HTML: the schedule widget markup (`#gregorianDate`, `#hijriDate`,
//!   `div.prayers > div` with `.name` / `.time` children);
//! - plain text: lines like `Fajr: 03:30` and `Date: Sunday 1 Jun 2025`.
//!
//! Extraction never fails. Missing or reordered fields simply produce fewer
//! entries; deciding whether that is enough is the caller's job.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::prayer::PrayerName;

/// Raw strings pulled from the source, before any date or time parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSchedule {
    /// Displayed calendar date, verbatim.
    pub date_text: Option<String>,
    /// Displayed hijri date, verbatim.
    pub hijri_date: Option<String>,
    /// `(name, time)` pairs in page order.
    pub entries: Vec<(String, String)>,
}

static GREGORIAN_DATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#gregorianDate, span.mosque-date").unwrap());
static HIJRI_DATE: Lazy<Selector> = Lazy::new(|| Selector::parse("#hijriDate").unwrap());
static PRAYER_ROWS: Lazy<Selector> = Lazy::new(|| Selector::parse("div.prayers > div").unwrap());
static ROW_NAME: Lazy<Selector> = Lazy::new(|| Selector::parse(".name").unwrap());
static ROW_TIME_INNER: Lazy<Selector> = Lazy::new(|| Selector::parse(".time > div").unwrap());
static ROW_TIME: Lazy<Selector> = Lazy::new(|| Selector::parse(".time").unwrap());

static TEXT_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t]*([a-z']+)[ \t]*[:\-]?[ \t]*(\d{1,2}:\d{2}(?:[ \t]*[ap]m)?)[ \t\r]*$",
    )
    .unwrap()
});
static TEXT_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)^[ \t]*date[ \t]*:[ \t]*(.+?)[ \t\r]*$").unwrap());
static TEXT_HIJRI: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)^[ \t]*hijri[ \t]*:[ \t]*(.+?)[ \t\r]*$").unwrap());

/// Extract a [`RawSchedule`] from page content.
pub fn extract_schedule(content: &str) -> RawSchedule {
    let from_html = extract_html(content);
    if !from_html.entries.is_empty() {
        return from_html;
    }

    let from_text = extract_text(content);
    RawSchedule {
        date_text: from_html.date_text.or(from_text.date_text),
        hijri_date: from_html.hijri_date.or(from_text.hijri_date),
        entries: from_text.entries,
    }
}

/// Extract from schedule widget markup.
pub fn extract_html(content: &str) -> RawSchedule {
    let doc = Html::parse_document(content);

    let entries = doc
        .select(&PRAYER_ROWS)
        .filter_map(|row| {
            let name = first_text(row, &ROW_NAME)?;
            let time = first_text(row, &ROW_TIME_INNER).or_else(|| first_text(row, &ROW_TIME))?;
            Some((name, time))
        })
        .collect();

    RawSchedule {
        date_text: doc
            .select(&GREGORIAN_DATE)
            .map(element_text)
            .find(|t| !t.is_empty()),
        hijri_date: doc
            .select(&HIJRI_DATE)
            .map(element_text)
            .find(|t| !t.is_empty()),
        entries,
    }
}

/// Extract from line-oriented plain text.
pub fn extract_text(content: &str) -> RawSchedule {
    let entries = TEXT_ENTRY
        .captures_iter(content)
        .filter(|caps| caps[1].parse::<PrayerName>().is_ok())
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();

    RawSchedule {
        date_text: TEXT_DATE.captures(content).map(|c| c[1].to_string()),
        hijri_date: TEXT_HIJRI.captures(content).map(|c| c[1].to_string()),
        entries,
    }
}

fn first_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
