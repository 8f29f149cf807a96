//! Request flows and their timer slots

use embassy_time::{Duration, Instant};

use crate::config::SchedulerConfig;
use crate::state::{FlowEvent, FlowState};

/// Timer slots owned by the scheduler: one watchdog per flow plus the
/// deferred follow-up request
pub const SLOTS: usize = 4;

/// Request flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flow {
    /// (Re)initialise the companion
    Init,
    /// Locate the nearest station
    Location,
    /// Fetch the current report
    Weather,
}

impl Flow {
    pub const ALL: [Flow; 3] = [Flow::Init, Flow::Location, Flow::Weather];

    /// Flow to run when this flow's watchdog expires
    ///
    /// Every timeout recovers through Init; Init simply retries itself.
    pub fn fallback(self) -> Flow {
        Flow::Init
    }

    /// Watchdog timeout for this flow
    pub fn timeout(self, config: &SchedulerConfig) -> Duration {
        match self {
            Flow::Init => config.init_timeout(),
            Flow::Location => config.location_timeout(),
            Flow::Weather => config.weather_timeout(),
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Flow::Init => 0,
            Flow::Location => 1,
            Flow::Weather => 2,
        }
    }
}

/// Timer slot keys in the scheduler's timer table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// Watchdog of an outstanding request
    Watchdog(Flow),
    /// Short delay before the request that follows an INIT or STATION answer
    FollowUp,
}

/// What to do when a scheduler timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Continuation {
    /// `expired` got no answer: mark the companion unresponsive, then run `then`
    Fallback { expired: Flow, then: Flow },
    /// Run a flow
    Run(Flow),
}

/// Bookkeeping for one flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlowRecord {
    /// Current state
    pub state: FlowState,
    /// When the last request of this flow was sent
    pub last_sent: Option<Instant>,
}

impl FlowRecord {
    /// Request handed to the transport
    pub(crate) fn sent(&mut self, now: Instant) {
        self.state = self.state.transition(FlowEvent::Send);
        self.last_sent = Some(now);
    }

    /// Answer received; settles straight back to idle
    pub(crate) fn acked(&mut self) {
        self.state = self
            .state
            .transition(FlowEvent::Ack)
            .transition(FlowEvent::Settle);
    }

    /// Watchdog expired; settles once the fallback has been started
    pub(crate) fn timed_out(&mut self) {
        self.state = self
            .state
            .transition(FlowEvent::Timeout)
            .transition(FlowEvent::Settle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_init() {
        for flow in Flow::ALL {
            assert_eq!(flow.fallback(), Flow::Init);
        }
    }

    #[test]
    fn test_timeouts() {
        let config = SchedulerConfig::default();
        assert_eq!(Flow::Init.timeout(&config), Duration::from_secs(5));
        assert_eq!(Flow::Location.timeout(&config), Duration::from_secs(60));
        assert_eq!(Flow::Weather.timeout(&config), Duration::from_secs(60));
    }

    #[test]
    fn test_record_cycle() {
        let now = Instant::from_secs(10);
        let mut record = FlowRecord::default();

        record.sent(now);
        assert_eq!(record.state, FlowState::Sent);
        assert_eq!(record.last_sent, Some(now));

        record.acked();
        assert_eq!(record.state, FlowState::Idle);

        record.sent(now);
        record.timed_out();
        assert_eq!(record.state, FlowState::Idle);
        assert_eq!(record.last_sent, Some(now));
    }
}
