//! External events driving the core

use flightweather_protocol::Message;

use crate::traits::{SendError, TimerId};

/// Events delivered by the platform, one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event<'a> {
    /// Clock tick (every second or every minute)
    Tick,
    /// Radio link connected (true) or lost (false)
    LinkChanged(bool),
    /// Message received from the companion
    Received(&'a Message),
    /// Inbound message dropped by the platform (too large, busy)
    Dropped,
    /// Outbound message delivered
    Sent,
    /// Outbound message delivery failed
    SendFailed(SendError),
    /// A registered one-shot timer fired
    TimerFired(TimerId),
    /// User tapped the watch
    Tapped,
}
