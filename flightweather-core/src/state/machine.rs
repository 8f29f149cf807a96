//! Request flow state machine
//!
//! `Idle → Sent → {Acked | TimedOut}`. Both outcomes settle back to `Idle`
//! once handled; flows repeat for as long as the app runs.

use flightweather_protocol::Key;

use crate::scheduler::Flow;
use crate::traits::SendError;

/// Per-flow request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowState {
    /// Nothing outstanding
    #[default]
    Idle,
    /// Request sent, watchdog armed
    Sent,
    /// Answer received, watchdog cancelled
    Acked,
    /// Watchdog expired, fallback pending
    TimedOut,
}

/// Inputs to a flow's state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowEvent {
    /// Request handed to the transport
    Send,
    /// Matching answer received
    Ack,
    /// Watchdog fired
    Timeout,
    /// Outcome handled
    Settle,
}

/// Failure conditions of the scheduling core
///
/// None of these is fatal: each resolves to a scheduled retry or a wait for
/// the next external event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Radio unreachable; requests suspended until it returns
    LinkDown,
    /// Radio up but the companion is silent; Init retries
    AppUnresponsive,
    /// A flow's watchdog expired
    RequestTimeout(Flow),
    /// Transport refused a message; logged only
    SendFailed(SendError),
    /// A received key had the wrong shape; that key is ignored
    MalformedPayload(Key),
}

impl FlowState {
    /// Process an event and return the next state
    pub fn transition(self, event: FlowEvent) -> Self {
        use FlowEvent::*;
        use FlowState::*;

        match (self, event) {
            // A new request supersedes whatever was outstanding
            (_, Send) => Sent,

            (Sent, Ack) => Acked,
            (Sent, Timeout) => TimedOut,

            // Unsolicited answers (pushed by the companion) still count
            (Idle, Ack) => Acked,

            (Acked | TimedOut, Settle) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_cycle_acked() {
        let state = FlowState::Idle.transition(FlowEvent::Send);
        assert_eq!(state, FlowState::Sent);

        let state = state.transition(FlowEvent::Ack);
        assert_eq!(state, FlowState::Acked);

        assert_eq!(state.transition(FlowEvent::Settle), FlowState::Idle);
    }

    #[test]
    fn test_request_cycle_timed_out() {
        let state = FlowState::Sent.transition(FlowEvent::Timeout);
        assert_eq!(state, FlowState::TimedOut);
        assert_eq!(state.transition(FlowEvent::Settle), FlowState::Idle);
    }

    #[test]
    fn test_resend_while_outstanding() {
        assert_eq!(FlowState::Sent.transition(FlowEvent::Send), FlowState::Sent);
        assert_eq!(FlowState::TimedOut.transition(FlowEvent::Send), FlowState::Sent);
    }

    #[test]
    fn test_stray_events_ignored() {
        assert_eq!(FlowState::Idle.transition(FlowEvent::Timeout), FlowState::Idle);
        assert_eq!(FlowState::Idle.transition(FlowEvent::Settle), FlowState::Idle);
        assert_eq!(FlowState::Sent.transition(FlowEvent::Settle), FlowState::Sent);
    }
}
