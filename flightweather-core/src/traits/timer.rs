//! One-shot timer service

use embassy_time::Duration;

/// Handle of a registered one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId(pub u32);

/// Trait for the platform's one-shot timers
///
/// A registered timer fires at most once, by the platform delivering
/// `Event::TimerFired(id)`. A cancelled timer must never be delivered.
pub trait TimerFacility {
    /// Register a timer firing after `delay`
    fn register(&mut self, delay: Duration) -> TimerId;

    /// Cancel a pending timer; no-op if it already fired
    fn cancel(&mut self, id: TimerId);
}
