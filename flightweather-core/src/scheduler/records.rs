//! Station and weather report records
//!
//! Both are replaced wholesale, and only when their leading fingerprint
//! changes. Trailing fields of a report (remarks, trends) are volatile and
//! would otherwise count as a new report on every poll.

use embassy_time::Instant;
use flightweather_protocol::MAX_TEXT_LEN;
use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum station identifier length
pub const MAX_STATION_LEN: usize = 16;

/// Compare the first `len` bytes of two strings
///
/// Shorter strings compare equal only if they match in full.
pub fn same_fingerprint(a: &str, b: &str, len: usize) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    a[..a.len().min(len)] == b[..b.len().min(len)]
}

/// Current reporting station
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Station {
    /// ICAO identifier as sent by the companion
    pub id: String<MAX_STATION_LEN>,
    /// When it was acquired
    pub acquired_at: Instant,
}

impl Station {
    /// Returns None if `id` does not fit
    pub fn new(id: &str, acquired_at: Instant) -> Option<Self> {
        let mut s = String::new();
        s.push_str(id).ok()?;
        Some(Self {
            id: s,
            acquired_at,
        })
    }

    pub fn as_str(&self) -> &str {
        self.id.as_str()
    }
}

/// Current weather report
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeatherRecord {
    /// Raw METAR text
    pub raw: String<MAX_TEXT_LEN>,
    /// Issue time reported by the companion, if any
    pub issued_at: Option<Instant>,
    /// When this report (by fingerprint) first arrived
    pub received_at: Instant,
}

impl WeatherRecord {
    /// Returns None if `raw` does not fit
    pub fn new(raw: &str, issued_at: Option<Instant>, received_at: Instant) -> Option<Self> {
        let mut s = String::new();
        s.push_str(raw).ok()?;
        Some(Self {
            raw: s,
            issued_at,
            received_at,
        })
    }

    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    /// Check if `raw` is the same report by its leading fingerprint
    pub fn matches(&self, raw: &str, fingerprint_len: usize) -> bool {
        same_fingerprint(&self.raw, raw, fingerprint_len)
    }
}

/// Stored station, times in seconds of the platform clock
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoredStation {
    pub id: String<MAX_STATION_LEN>,
    pub acquired_at_s: u64,
}

/// Stored weather report, times in seconds of the platform clock
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoredWeather {
    pub raw: String<MAX_TEXT_LEN>,
    pub issued_at_s: Option<u64>,
    pub received_at_s: u64,
}

/// State persisted across app launches
///
/// Read once at startup and written once at shutdown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub station: Option<StoredStation>,
    pub weather: Option<StoredWeather>,
}

impl From<&Station> for StoredStation {
    fn from(station: &Station) -> Self {
        Self {
            id: station.id.clone(),
            acquired_at_s: station.acquired_at.as_secs(),
        }
    }
}

impl From<&StoredStation> for Station {
    fn from(stored: &StoredStation) -> Self {
        Self {
            id: stored.id.clone(),
            acquired_at: Instant::from_secs(stored.acquired_at_s),
        }
    }
}

impl From<&WeatherRecord> for StoredWeather {
    fn from(record: &WeatherRecord) -> Self {
        Self {
            raw: record.raw.clone(),
            issued_at_s: record.issued_at.map(|t| t.as_secs()),
            received_at_s: record.received_at.as_secs(),
        }
    }
}

impl From<&StoredWeather> for WeatherRecord {
    fn from(stored: &StoredWeather) -> Self {
        Self {
            raw: stored.raw.clone(),
            issued_at: stored.issued_at_s.map(Instant::from_secs),
            received_at: Instant::from_secs(stored.received_at_s),
        }
    }
}
