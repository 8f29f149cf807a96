//! Configuration type definitions

use embassy_time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of delayed UI timers that may be pending at once (one per indicator)
pub const UI_TIMERS: usize = 3;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A polling interval is zero
    ZeroInterval,
    /// A watchdog timeout is zero
    ZeroTimeout,
    /// The fast-polling band is empty or inverted
    EmptyBand,
    /// Fingerprint length is zero
    ZeroFingerprint,
}

/// Polling cadence for weather requests
///
/// All values are in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PollingConfig {
    /// Interval inside the expected-issuance band
    pub fast_min: u32,
    /// Interval outside the band
    pub slow_min: u32,
    /// Interval while the bootstrap counter is non-zero
    pub bootstrap_min: u32,
    /// Interval in battery saving mode
    pub power_save_min: u32,
    /// Lower bound of the fast band (exclusive)
    pub band_low_min: u32,
    /// Upper bound of the fast band (exclusive)
    pub band_high_min: u32,
    /// Bootstrap counter value after cold start, re-init or station change
    pub bootstrap_updates: u8,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            fast_min: 1,
            slow_min: 14,
            bootstrap_min: 1,
            power_save_min: 60,
            band_low_min: 25,
            band_high_min: 37,
            bootstrap_updates: 2,
        }
    }
}

/// Watchdog timeouts per request flow (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchdogConfig {
    pub init_s: u32,
    pub location_s: u32,
    pub weather_s: u32,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            init_s: 5,
            location_s: 60,
            weather_s: 60,
        }
    }
}

/// Delays for UI visibility changes (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UiTimingConfig {
    /// GPS and network indicators linger this long after going idle
    pub indicator_hide_s: u32,
    /// IMC alert dialog stays up this long
    pub alert_hide_s: u32,
}

impl Default for UiTimingConfig {
    fn default() -> Self {
        Self {
            indicator_hide_s: 5,
            alert_hide_s: 60,
        }
    }
}

/// Complete scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchedulerConfig {
    pub polling: PollingConfig,
    pub watchdog: WatchdogConfig,
    pub ui: UiTimingConfig,
    /// Station older than this is refreshed before asking for weather
    pub location_max_age_min: u32,
    /// Delay before the weather request that follows INIT or STATION
    pub follow_up_ms: u32,
    /// Leading characters compared to decide whether a report changed
    pub fingerprint_len: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            polling: PollingConfig::default(),
            watchdog: WatchdogConfig::default(),
            ui: UiTimingConfig::default(),
            location_max_age_min: 20,
            follow_up_ms: 100,
            fingerprint_len: 12,
        }
    }
}

impl SchedulerConfig {
    /// Check the configuration for values the scheduler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.polling;
        if p.fast_min == 0 || p.slow_min == 0 || p.bootstrap_min == 0 || p.power_save_min == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        // Band is exclusive on both ends, so it needs at least one whole minute inside
        if p.band_low_min.saturating_add(1) >= p.band_high_min {
            return Err(ConfigError::EmptyBand);
        }

        let w = &self.watchdog;
        if w.init_s == 0 || w.location_s == 0 || w.weather_s == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        if self.fingerprint_len == 0 {
            return Err(ConfigError::ZeroFingerprint);
        }

        Ok(())
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.watchdog.init_s as u64)
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.watchdog.location_s as u64)
    }

    pub fn weather_timeout(&self) -> Duration {
        Duration::from_secs(self.watchdog.weather_s as u64)
    }

    pub fn follow_up_delay(&self) -> Duration {
        Duration::from_millis(self.follow_up_ms as u64)
    }

    pub fn indicator_hide_delay(&self) -> Duration {
        Duration::from_secs(self.ui.indicator_hide_s as u64)
    }

    pub fn alert_hide_delay(&self) -> Duration {
        Duration::from_secs(self.ui.alert_hide_s as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SchedulerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.init_timeout(), Duration::from_secs(5));
        assert_eq!(config.weather_timeout(), Duration::from_secs(60));
        assert_eq!(config.follow_up_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = SchedulerConfig::default();
        config.polling.slow_min = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));
    }

    #[test]
    fn test_empty_band_rejected() {
        let mut config = SchedulerConfig::default();
        config.polling.band_low_min = 30;
        config.polling.band_high_min = 31;
        assert_eq!(config.validate(), Err(ConfigError::EmptyBand));

        config.polling.band_high_min = 32;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = SchedulerConfig::default();
        config.watchdog.init_s = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }
}
