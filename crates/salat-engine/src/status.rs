//! Current and next prayer resolution.
//!
//! A pure function of a [`DailySchedule`] and a reference instant. Only the five
//! ritual prayers take part; Sunrise is listed but never current or next.
//!
//! Windows:
//! - each prayer is current from its own start until the next ritual prayer
//!   starts (start inclusive, end exclusive);
//! - Isha stays current until tomorrow's Fajr, and yesterday's Isha is still
//!   current before today's Fajr;
//! - a last prayer that is not Isha (incomplete source) is current for
//!   [`StatusPolicy::open_window`].
//!
//! When Fajr is missing, the Fajr that closes Isha's night is synthesised as
//! [`StatusPolicy::missing_fajr_offset`] after Isha, or as
//! [`StatusPolicy::fallback_fajr`] on the following day if Isha is missing
//! too. A status that relied on it logs a warning and sets
//! [`ScheduleStatus::synthetic_fajr`].

use chrono::{DateTime, Duration, NaiveTime, TimeZone};
use log::warn;
use serde::Serialize;

use crate::error::EngineError;
use crate::prayer::{NamedTime, PrayerName};
use crate::schedule::DailySchedule;
use crate::time_parser::format_clock;
use crate::zone::{ScheduleZone, ZonedInstant};

/// Window lengths used where the schedule itself cannot bound a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    /// How long a last non-Isha prayer stays current.
    pub open_window: Duration,
    /// Offset from the day's Isha used as tomorrow's Fajr when Fajr is missing.
    pub missing_fajr_offset: Duration,
    /// Wall-clock Fajr used when both Fajr and Isha are missing.
    pub fallback_fajr: NaiveTime,
}

impl StatusPolicy {
    pub const DEFAULT_OPEN_WINDOW_MINUTES: i64 = 90;
    pub const DEFAULT_MISSING_FAJR_OFFSET_HOURS: i64 = 8;
    /// Upper bound for both windows.
    pub const MAX_WINDOW_MINUTES: i64 = 24 * 60;

    /// Check both windows lie in `(0, MAX_WINDOW_MINUTES]`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] naming the offending window.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (label, window) in [
            ("open window", self.open_window),
            ("missing-Fajr offset", self.missing_fajr_offset),
        ] {
            let minutes = window.num_minutes();
            if window <= Duration::zero() || minutes > Self::MAX_WINDOW_MINUTES {
                return Err(EngineError::Config(format!(
                    "{label} must be between 1 and {} minutes, got {minutes}",
                    Self::MAX_WINDOW_MINUTES
                )));
            }
        }
        Ok(())
    }
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            open_window: Duration::minutes(Self::DEFAULT_OPEN_WINDOW_MINUTES),
            missing_fajr_offset: Duration::hours(Self::DEFAULT_MISSING_FAJR_OFFSET_HOURS),
            fallback_fajr: NaiveTime::from_hms_opt(3, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// The prayer whose window contains the reference instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentSlot {
    pub name: PrayerName,
    pub display_time: String,
}

/// Hours and remaining minutes until a slot starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eta {
    pub hours: i64,
    pub minutes: i64,
}

impl Eta {
    pub fn from_minutes(total: i64) -> Self {
        let total = total.max(0);
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn total_minutes(&self) -> i64 {
        self.hours * 60 + self.minutes
    }
}

/// The first prayer starting after the reference instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextSlot {
    pub name: PrayerName,
    pub display_time: String,
    pub instant: ZonedInstant,
    /// Whole minutes from the reference instant to `instant`.
    pub eta_minutes: i64,
    /// The slot is tomorrow's Fajr (the day's prayers are all past).
    pub is_tomorrow: bool,
}

impl NextSlot {
    pub fn eta(&self) -> Eta {
        Eta::from_minutes(self.eta_minutes)
    }

    /// Display label, e.g. `"Fajr (tomorrow)"`.
    pub fn label(&self) -> String {
        if self.is_tomorrow {
            format!("{} (tomorrow)", self.name)
        } else {
            self.name.to_string()
        }
    }

    /// Countdown text, e.g. `"2h 5m"`, `"45m"` or `"4h 44m (tomorrow)"`.
    pub fn time_until(&self) -> String {
        let eta = self.eta();
        let mut text = String::new();
        if eta.hours > 0 {
            text.push_str(&format!("{}h ", eta.hours));
        }
        text.push_str(&format!("{}m", eta.minutes));
        if self.is_tomorrow {
            text.push_str(" (tomorrow)");
        }
        text
    }
}

/// Resolution result. Recomputed per query, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScheduleStatus {
    pub current: Option<CurrentSlot>,
    pub next: Option<NextSlot>,
    /// A synthetic Fajr boundary was needed because the source listed no Fajr.
    pub synthetic_fajr: bool,
}

/// Resolve the current and next prayer for `now`.
///
/// `now` may be in any zone; it is normalised into `zone` before any
/// comparison. The result is a pure function of its inputs. Whenever the
/// schedule holds at least one ritual prayer, `next` is set.
pub fn resolve_status<T: TimeZone>(
    schedule: &DailySchedule,
    now: &DateTime<T>,
    zone: &ScheduleZone,
    policy: &StatusPolicy,
) -> ScheduleStatus {
    let now = zone.to_zoned(now);
    let rituals: Vec<&NamedTime> = schedule.ritual_entries().collect();

    let mut status = ScheduleStatus::default();
    if rituals.is_empty() {
        warn!("no ritual prayers in schedule for {}", schedule.calendar_date);
        return status;
    }

    let fajr = FajrBoundaries {
        schedule,
        zone,
        policy,
    };

    if let Some((slot, synthetic)) = midnight_isha(schedule, &now, zone, &fajr)
        .or_else(|| current_slot(&rituals, &now, &fajr, policy))
    {
        status.current = Some(slot);
        status.synthetic_fajr |= synthetic;
    }

    status.next = rituals
        .iter()
        .find(|e| e.instant > now)
        .map(|e| NextSlot {
            name: e.name,
            display_time: e.display_time.clone(),
            instant: e.instant,
            eta_minutes: (e.instant - now).num_minutes(),
            is_tomorrow: false,
        });
    if status.next.is_none() {
        if let Some((slot, synthetic)) = roll_over(schedule, &now, &fajr) {
            status.next = Some(slot);
            status.synthetic_fajr |= synthetic;
        }
    }

    if status.synthetic_fajr {
        warn!(
            "source lists no Fajr for {}; using a synthetic Fajr boundary",
            schedule.calendar_date
        );
    }
    status
}

/// Before today's Fajr, yesterday's Isha may still be current.
fn midnight_isha(
    schedule: &DailySchedule,
    now: &ZonedInstant,
    zone: &ScheduleZone,
    fajr: &FajrBoundaries<'_>,
) -> Option<(CurrentSlot, bool)> {
    let isha = schedule.get(PrayerName::Isha)?;
    if *now < zone.shift_days(&isha.instant, -1) {
        return None;
    }
    let today = fajr.on(0)?;
    (*now < today.instant).then(|| {
        let slot = CurrentSlot {
            name: PrayerName::Isha,
            display_time: isha.display_time.clone(),
        };
        (slot, today.synthetic)
    })
}

fn current_slot(
    rituals: &[&NamedTime],
    now: &ZonedInstant,
    fajr: &FajrBoundaries<'_>,
    policy: &StatusPolicy,
) -> Option<(CurrentSlot, bool)> {
    for (i, entry) in rituals.iter().enumerate() {
        if *now < entry.instant {
            continue;
        }
        let (open, synthetic) = if entry.name == PrayerName::Isha {
            fajr.on(1)
                .map_or((true, false), |b| (*now < b.instant, b.synthetic))
        } else if let Some(following) = rituals.get(i + 1) {
            (*now < following.instant, false)
        } else {
            warn!(
                "last prayer {} is not Isha; assuming a {}-minute window",
                entry.name,
                policy.open_window.num_minutes()
            );
            let open = entry
                .instant
                .checked_add_signed(policy.open_window)
                .map_or(true, |end| *now < end);
            (open, false)
        };

        if open {
            let slot = CurrentSlot {
                name: entry.name,
                display_time: entry.display_time.clone(),
            };
            return Some((slot, synthetic));
        }
    }
    None
}

/// After the day's last prayer, the next slot is the following Fajr. When
/// `now` lies past the schedule's own night, the first Fajr after `now` is used.
fn roll_over(
    schedule: &DailySchedule,
    now: &ZonedInstant,
    fajr: &FajrBoundaries<'_>,
) -> Option<(NextSlot, bool)> {
    let lag = (now.date_naive() - schedule.calendar_date).num_days().max(0);
    let boundary = [1, lag + 1, lag + 2]
        .into_iter()
        .filter_map(|offset| fajr.on(offset))
        .find(|b| b.instant > *now)?;

    let slot = NextSlot {
        name: PrayerName::Fajr,
        display_time: boundary.display_time,
        instant: boundary.instant,
        eta_minutes: (boundary.instant - *now).num_minutes(),
        is_tomorrow: true,
    };
    Some((slot, boundary.synthetic))
}

struct Boundary {
    instant: ZonedInstant,
    display_time: String,
    /// The source listed no Fajr.
    synthetic: bool,
}

/// Fajr boundaries around the schedule's day.
///
/// With Fajr listed, the boundary is that wall-clock reading on the wanted
/// day. Without it, the boundary is the previous night's Isha plus
/// [`StatusPolicy::missing_fajr_offset`], or [`StatusPolicy::fallback_fajr`]
/// on the wanted day when Isha is missing too.
struct FajrBoundaries<'a> {
    schedule: &'a DailySchedule,
    zone: &'a ScheduleZone,
    policy: &'a StatusPolicy,
}

impl FajrBoundaries<'_> {
    /// Fajr on the schedule's date plus `offset` days; `None` only outside
    /// the representable range.
    fn on(&self, offset: i64) -> Option<Boundary> {
        if let Some(fajr) = self.schedule.get(PrayerName::Fajr) {
            return Some(Boundary {
                instant: self.zone.shift_days(&fajr.instant, offset),
                display_time: fajr.display_time.clone(),
                synthetic: false,
            });
        }

        let instant = self
            .schedule
            .get(PrayerName::Isha)
            .and_then(|isha| {
                self.zone
                    .shift_days(&isha.instant, offset - 1)
                    .checked_add_signed(self.policy.missing_fajr_offset)
            })
            .or_else(|| {
                let date = self
                    .schedule
                    .calendar_date
                    .checked_add_signed(Duration::days(offset))?;
                Some(self.zone.at_wall_clock(date, self.policy.fallback_fajr))
            })?;

        Some(Boundary {
            instant,
            display_time: format_clock(&instant),
            synthetic: true,
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_parser::DateProvenance;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn berlin() -> ScheduleZone {
        ScheduleZone::parse("Europe/Berlin").unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn at(h: u32, m: u32) -> ZonedInstant {
        berlin().at_wall_clock(day(), NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn schedule_of(entries: &[(PrayerName, &str)]) -> DailySchedule {
        let zone = berlin();
        let entries = entries
            .iter()
            .map(|(name, time)| {
                let t = NaiveTime::parse_from_str(time, "%H:%M").unwrap();
                NamedTime::new(*name, *time, zone.at_wall_clock(day(), t))
            })
            .collect();
        DailySchedule::new(day(), entries, DateProvenance::Current)
    }

    fn full() -> DailySchedule {
        schedule_of(&[
            (PrayerName::Fajr, "03:30"),
            (PrayerName::Sunrise, "05:20"),
            (PrayerName::Dhuhr, "13:15"),
            (PrayerName::Asr, "17:30"),
            (PrayerName::Maghrib, "21:15"),
            (PrayerName::Isha, "22:45"),
        ])
    }

    fn resolve(schedule: &DailySchedule, now: ZonedInstant) -> ScheduleStatus {
        resolve_status(schedule, &now, &berlin(), &StatusPolicy::default())
    }

    fn current_name(status: &ScheduleStatus) -> Option<PrayerName> {
        status.current.as_ref().map(|c| c.name)
    }

    // ── Current slot ────────────────────────────────────────────────────

    #[test]
    fn test_between_dhuhr_and_asr() {
        let status = resolve(&full(), at(15, 0));
        assert_eq!(current_name(&status), Some(PrayerName::Dhuhr));
        let next = status.next.unwrap();
        assert_eq!(next.name, PrayerName::Asr);
        assert_eq!(next.eta_minutes, 150);
        assert_eq!(next.time_until(), "2h 30m");
        assert!(!next.is_tomorrow);
    }

    #[test]
    fn test_start_boundary_is_inclusive() {
        let status = resolve(&full(), at(13, 15));
        assert_eq!(current_name(&status), Some(PrayerName::Dhuhr));
        assert_eq!(status.next.unwrap().name, PrayerName::Asr);
    }

    #[test]
    fn test_one_minute_before_dhuhr_is_fajr_window() {
        // Sunrise does not end Fajr's window
        let status = resolve(&full(), at(13, 14));
        assert_eq!(current_name(&status), Some(PrayerName::Fajr));
        let next = status.next.unwrap();
        assert_eq!(next.name, PrayerName::Dhuhr);
        assert_eq!(next.eta_minutes, 1);
        assert_eq!(next.time_until(), "1m");
    }

    #[test]
    fn test_sunrise_never_next() {
        let status = resolve(&full(), at(4, 0));
        assert_eq!(status.next.unwrap().name, PrayerName::Dhuhr);
    }

    #[test]
    fn test_before_fajr_yesterday_isha_is_current() {
        let status = resolve(&full(), at(3, 29));
        let current = status.current.unwrap();
        assert_eq!(current.name, PrayerName::Isha);
        assert_eq!(current.display_time, "22:45");
        let next = status.next.unwrap();
        assert_eq!(next.name, PrayerName::Fajr);
        assert_eq!(next.eta_minutes, 1);
        assert!(!next.is_tomorrow);
    }

    #[test]
    fn test_isha_current_until_midnight_and_beyond() {
        let status = resolve(&full(), at(23, 59));
        assert_eq!(current_name(&status), Some(PrayerName::Isha));
        let status = resolve(&full(), at(0, 1));
        assert_eq!(current_name(&status), Some(PrayerName::Isha));
    }

    #[test]
    fn test_last_non_isha_gets_open_window() {
        let schedule = schedule_of(&[(PrayerName::Fajr, "03:30"), (PrayerName::Dhuhr, "13:15")]);
        let status = resolve(&schedule, at(14, 44));
        assert_eq!(current_name(&status), Some(PrayerName::Dhuhr));
        let status = resolve(&schedule, at(14, 45));
        assert_eq!(current_name(&status), None);
        // Next is still tomorrow's Fajr
        assert_eq!(status.next.unwrap().name, PrayerName::Fajr);
    }

    #[test]
    fn test_custom_open_window() {
        let schedule = schedule_of(&[(PrayerName::Fajr, "03:30"), (PrayerName::Dhuhr, "13:15")]);
        let policy = StatusPolicy {
            open_window: Duration::minutes(150),
            ..StatusPolicy::default()
        };
        let status = resolve_status(&schedule, &at(15, 30), &berlin(), &policy);
        assert_eq!(current_name(&status), Some(PrayerName::Dhuhr));
    }

    // ── Roll-over ───────────────────────────────────────────────────────

    #[test]
    fn test_after_isha_next_is_tomorrow_fajr() {
        let status = resolve(&full(), at(22, 46));
        assert_eq!(current_name(&status), Some(PrayerName::Isha));
        let next = status.next.unwrap();
        assert_eq!(next.name, PrayerName::Fajr);
        assert!(next.is_tomorrow);
        assert_eq!(next.label(), "Fajr (tomorrow)");
        assert_eq!(next.instant.to_rfc3339(), "2025-06-02T03:30:00+02:00");
        // 22:46 → 03:30 is 4h 44m
        assert_eq!(next.eta_minutes, 284);
        assert_eq!(next.time_until(), "4h 44m (tomorrow)");
        assert!(!status.synthetic_fajr);
    }

    #[test]
    fn test_eta_truncates_seconds() {
        let now = at(15, 0) + Duration::seconds(30);
        let status = resolve(&full(), now);
        assert_eq!(status.next.unwrap().eta_minutes, 149);
    }

    // ── Missing Fajr ────────────────────────────────────────────────────

    #[test]
    fn test_missing_fajr_uses_synthetic_boundary() {
        let schedule = schedule_of(&[(PrayerName::Dhuhr, "13:15"), (PrayerName::Isha, "22:45")]);
        let status = resolve(&schedule, at(23, 0));
        assert_eq!(current_name(&status), Some(PrayerName::Isha));
        let next = status.next.unwrap();
        assert!(next.is_tomorrow);
        assert_eq!(next.instant.to_rfc3339(), "2025-06-02T06:45:00+02:00");
        assert_eq!(next.display_time, "06:45");
        assert!(status.synthetic_fajr);
    }

    #[test]
    fn test_missing_fajr_not_flagged_when_unused() {
        let schedule = schedule_of(&[(PrayerName::Dhuhr, "13:15"), (PrayerName::Isha, "22:45")]);
        let status = resolve(&schedule, at(10, 0));
        assert_eq!(status.current, None);
        assert_eq!(status.next.unwrap().name, PrayerName::Dhuhr);
        assert!(!status.synthetic_fajr);
    }

    #[test]
    fn test_missing_fajr_keeps_yesterdays_isha_after_midnight() {
        let schedule = schedule_of(&[(PrayerName::Dhuhr, "13:15"), (PrayerName::Isha, "22:45")]);
        // 22:45 yesterday + 8h = 06:45 today
        let status = resolve(&schedule, at(1, 0));
        assert_eq!(current_name(&status), Some(PrayerName::Isha));
        assert!(status.synthetic_fajr);
        let next = status.next.unwrap();
        assert_eq!(next.name, PrayerName::Dhuhr);
        assert!(!next.is_tomorrow);

        let status = resolve(&schedule, at(6, 45));
        assert_eq!(current_name(&status), None);
    }

    #[test]
    fn test_missing_fajr_and_isha_rolls_to_fallback_fajr() {
        let schedule = schedule_of(&[(PrayerName::Dhuhr, "13:15")]);
        let status = resolve(&schedule, at(22, 0));
        assert_eq!(current_name(&status), None);
        let next = status.next.unwrap();
        assert_eq!(next.name, PrayerName::Fajr);
        assert!(next.is_tomorrow);
        assert_eq!(next.instant.to_rfc3339(), "2025-06-02T03:30:00+02:00");
        assert_eq!(next.display_time, "03:30");
        assert_eq!(next.eta_minutes, 330);
        assert!(status.synthetic_fajr);
    }

    #[test]
    fn test_roll_over_when_now_is_days_past_schedule() {
        let now = berlin().at_wall_clock(
            NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        );
        let status = resolve(&full(), now);
        let next = status.next.unwrap();
        assert_eq!(next.name, PrayerName::Fajr);
        assert_eq!(next.instant.to_rfc3339(), "2025-06-04T03:30:00+02:00");
        assert!(next.eta_minutes >= 0);
    }

    #[test]
    fn test_out_of_range_open_window_does_not_panic() {
        let schedule = schedule_of(&[(PrayerName::Fajr, "03:30"), (PrayerName::Dhuhr, "13:15")]);
        let policy = StatusPolicy {
            open_window: Duration::minutes(1_000_000_000_000),
            ..StatusPolicy::default()
        };
        let status = resolve_status(&schedule, &at(14, 0), &berlin(), &policy);
        assert_eq!(current_name(&status), Some(PrayerName::Dhuhr));
        assert!(policy.validate().is_err());
    }

    // ── Policy validation ───────────────────────────────────────────────

    #[test]
    fn test_default_policy_is_valid() {
        assert!(StatusPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_policy_window_bounds() {
        let policy = |minutes| StatusPolicy {
            missing_fajr_offset: Duration::minutes(minutes),
            ..StatusPolicy::default()
        };
        assert!(policy(StatusPolicy::MAX_WINDOW_MINUTES).validate().is_ok());
        assert!(policy(StatusPolicy::MAX_WINDOW_MINUTES + 1).validate().is_err());
        assert!(policy(0).validate().is_err());
        assert!(policy(-5).validate().is_err());
    }

    // ── Degenerate input ────────────────────────────────────────────────

    #[test]
    fn test_sunrise_only_resolves_nothing() {
        let schedule = schedule_of(&[(PrayerName::Sunrise, "05:20")]);
        let status = resolve(&schedule, at(12, 0));
        assert_eq!(status, ScheduleStatus::default());
    }

    #[test]
    fn test_now_in_other_zone_is_normalised() {
        // 13:15 CEST == 11:15 UTC
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 11, 15, 0).unwrap();
        let status = resolve_status(&full(), &now, &berlin(), &StatusPolicy::default());
        assert_eq!(current_name(&status), Some(PrayerName::Dhuhr));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let schedule = full();
        let a = resolve(&schedule, at(19, 7));
        let b = resolve(&schedule, at(19, 7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_eta_from_minutes() {
        let eta = Eta::from_minutes(125);
        assert_eq!((eta.hours, eta.minutes), (2, 5));
        assert_eq!(eta.total_minutes(), 125);
        assert_eq!(Eta::from_minutes(-3).total_minutes(), 0);
    }
}
