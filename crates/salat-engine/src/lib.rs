//! # salat-engine
//!
//! Deterministic prayer-schedule resolution.
//!
//! Takes a daily schedule scraped from a third-party page (five prayer times plus
//! sunrise as `"HH:MM"` strings, and a free-text date), anchors it to the
//! viewer's date in an explicit time zone, and works out which prayer is current
//! and which is next. Prayer times are never computed astronomically; the engine
//! only trusts, normalizes and reasons about what the source published.
//!
//! All functions take the reference "now" as an argument (no system clock
//! access), so results are reproducible and testable.
//!
//! ## Modules
//!
//! - [`zone`]: Time-zone normalization and wall-clock anchoring
//! - [`date_parser`]: Displayed date text → calendar date, staleness detection
//! - [`time_parser`]: `"HH:MM"` / `"HH:MM AM"` → zoned instant
//! - [`prayer`]: Prayer names and timed entries
//! - [`schedule`]: The day's parsed, ordered schedule
//! - [`status`]: Current / next prayer resolution
//! - [`fallback`]: Synthetic schedule for failed fetches
//! - [`extract`]: Best-effort extraction from page HTML or text
//! - [`source`]: The fetching capability
//! - [`payload`]: JSON shape for presentation code
//! - [`engine`]: The end-to-end pipeline
//! - [`config`]: Startup configuration
//! - [`error`]: Error types

pub mod config;
pub mod date_parser;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod payload;
pub mod prayer;
pub mod schedule;
pub mod source;
pub mod status;
pub mod time_parser;
pub mod zone;

pub use config::EngineConfig;
pub use date_parser::{anchor_date, parse_displayed_date, DateAnchor, DateProvenance, ParsedDate};
pub use engine::ScheduleEngine;
pub use error::EngineError;
pub use extract::{extract_schedule, RawSchedule};
pub use fallback::build_fallback;
pub use payload::PrayerTimesPayload;
pub use prayer::{NamedTime, PrayerName};
pub use schedule::{build_schedule, DailySchedule};
pub use source::{SourceFetcher, StaticSource, UnavailableSource};
pub use status::{resolve_status, CurrentSlot, Eta, NextSlot, ScheduleStatus, StatusPolicy};
pub use time_parser::{parse_clock, parse_time};
pub use zone::{ScheduleZone, ZonedInstant};
