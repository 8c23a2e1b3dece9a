//! Prayer names and timed schedule entries.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::EngineError;
use crate::zone::ZonedInstant;

/// The six daily slots a schedule page lists.
///
/// Sunrise is informational: it is carried in listings but never becomes the
/// current or next prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// All slots in their customary daily order.
    pub const ALL: [PrayerName; 6] = [
        PrayerName::Fajr,
        PrayerName::Sunrise,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    /// Whether this is one of the five ritual prayers used for status.
    pub fn is_ritual(self) -> bool {
        self != PrayerName::Sunrise
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Sunrise => "Sunrise",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }
}

impl fmt::Display for PrayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrayerName {
    type Err = EngineError;

    /// Case-insensitive, accepting the transliterations schedule sites use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_alphabetic())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "fajr" | "fajar" | "subh" | "subuh" => Ok(PrayerName::Fajr),
            "sunrise" | "shuruq" | "shurooq" | "shuruk" | "chourouk" => Ok(PrayerName::Sunrise),
            "dhuhr" | "duhr" | "zuhr" | "zohr" | "dohr" | "thuhr" => Ok(PrayerName::Dhuhr),
            "asr" | "asar" => Ok(PrayerName::Asr),
            "maghrib" | "maghreb" => Ok(PrayerName::Maghrib),
            "isha" | "ishaa" | "icha" => Ok(PrayerName::Isha),
            _ => Err(EngineError::Extraction(format!(
                "unknown prayer name: '{}'",
                s.trim()
            ))),
        }
    }
}

/// One parsed schedule entry.
///
/// `instant` carries the same wall-clock reading as `display_time` in the
/// schedule zone. Entries are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedTime {
    pub name: PrayerName,
    /// The time as shown by the source (e.g. `"13:15"`).
    pub display_time: String,
    pub instant: ZonedInstant,
}

impl NamedTime {
    pub fn new(name: PrayerName, display_time: impl Into<String>, instant: ZonedInstant) -> Self {
        Self {
            name,
            display_time: display_time.into(),
            instant,
        }
    }
}
