//! Polling interval calculation
//!
//! Reports are issued roughly hourly at unpredictable offsets. Polling fast
//! just after the expected issuance window catches a fresh report early
//! without polling fast all the time.

use embassy_time::{Duration, Instant};

use crate::config::PollingConfig;

/// Which rule chose the interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollingMode {
    /// Battery saving overrides everything
    PowerSave,
    /// Converging after cold start, re-init or station change
    Bootstrap,
    /// Inside the expected-issuance band
    Fast,
    /// Outside the band
    Slow,
}

/// Whole minutes from `since` to `now` (zero if `since` is in the future)
pub fn elapsed_minutes(now: Instant, since: Instant) -> u64 {
    now.saturating_duration_since(since).as_secs() / 60
}

/// Pure polling interval policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntervalPolicy {
    config: PollingConfig,
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        Self::new(PollingConfig::default())
    }
}

impl IntervalPolicy {
    pub const fn new(config: PollingConfig) -> Self {
        Self { config }
    }

    /// Select the polling rule
    ///
    /// `last_update` is when the weather report last changed materially;
    /// `None` means never, which counts as outside the band.
    pub fn mode(
        &self,
        now: Instant,
        last_update: Option<Instant>,
        power_save: bool,
        bootstrap: u8,
    ) -> PollingMode {
        if power_save {
            return PollingMode::PowerSave;
        }
        // Bootstrap wins even outside the band, until the first updates settle
        if bootstrap > 0 {
            return PollingMode::Bootstrap;
        }

        let Some(last_update) = last_update else {
            return PollingMode::Slow;
        };
        let age = elapsed_minutes(now, last_update);
        if age > self.config.band_low_min as u64 && age < self.config.band_high_min as u64 {
            PollingMode::Fast
        } else {
            PollingMode::Slow
        }
    }

    /// Interval until the next weather request
    pub fn next_interval(
        &self,
        now: Instant,
        last_update: Option<Instant>,
        power_save: bool,
        bootstrap: u8,
    ) -> Duration {
        let minutes = match self.mode(now, last_update, power_save, bootstrap) {
            PollingMode::PowerSave => self.config.power_save_min,
            PollingMode::Bootstrap => self.config.bootstrap_min,
            PollingMode::Fast => self.config.fast_min,
            PollingMode::Slow => self.config.slow_min,
        };
        Duration::from_secs(minutes as u64 * 60)
    }
}
