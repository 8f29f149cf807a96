//! Periodic update loop
//!
//! Driven by the host clock tick (every minute or finer). Each tick
//! refreshes the report age and issues a weather request once the polling
//! interval has elapsed since the last check.

use embassy_time::{Duration, Instant};

use crate::policy::{elapsed_minutes, IntervalPolicy, PollingMode};
use crate::scheduler::{RequestOutcome, RequestScheduler};
use crate::traits::{MetarAge, TimerFacility, Transport};

/// Ages beyond this many minutes are reported in hours
pub const MAX_AGE_MINUTES: u64 = 240;

/// Report age shown from this many hours on
pub const MAX_AGE_HOURS: u32 = (MAX_AGE_MINUTES / 60) as u32;

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// Rule that chose the interval
    pub mode: PollingMode,
    /// Interval in effect
    pub interval: Duration,
    /// Result of the weather request, if one was due
    pub request: Option<RequestOutcome>,
    /// Age of the current report
    pub age: MetarAge,
}

/// Age of a report issued at `issued_at`
pub fn metar_age(now: Instant, issued_at: Option<Instant>) -> MetarAge {
    let Some(issued_at) = issued_at else {
        return MetarAge::Unknown;
    };
    let minutes = elapsed_minutes(now, issued_at);
    if minutes > MAX_AGE_MINUTES {
        MetarAge::OverHours(MAX_AGE_HOURS)
    } else {
        MetarAge::Minutes(minutes as u32)
    }
}

/// Decides when weather requests are due
#[derive(Debug, Clone, Copy)]
pub struct UpdateLoop {
    policy: IntervalPolicy,
}

impl UpdateLoop {
    pub const fn new(policy: IntervalPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IntervalPolicy {
        &self.policy
    }

    /// Run one tick
    ///
    /// When due, the check clock restarts whatever the request outcome, so
    /// a request that could not go out is not retried on every tick.
    pub fn tick<P>(&self, now: Instant, scheduler: &mut RequestScheduler, io: &mut P) -> Tick
    where
        P: Transport + TimerFacility,
    {
        let age = metar_age(now, scheduler.report().and_then(|r| r.issued_at));

        let last_update = scheduler.last_update();
        let power_save = scheduler.power_save();
        let bootstrap = scheduler.bootstrap();
        let mode = self.policy.mode(now, last_update, power_save, bootstrap);
        let interval = self
            .policy
            .next_interval(now, last_update, power_save, bootstrap);

        let elapsed = elapsed_minutes(now, scheduler.last_weather_check());
        let request = if elapsed >= interval.as_secs() / 60 {
            trace!("weather check due after {} min ({:?})", elapsed, mode);
            let outcome = scheduler.request_weather(now, io);
            scheduler.stamp_weather_check(now);
            Some(outcome)
        } else {
            None
        };

        Tick {
            mode,
            interval,
            request,
            age,
        }
    }
}
