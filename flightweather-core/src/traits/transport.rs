//! Message transport to the companion

use flightweather_protocol::Message;

/// Reasons an outbound message could not be handed to the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError {
    /// A previous message is still in flight
    Busy,
    /// Message does not fit the outbox
    TooLarge,
    /// Radio link is not connected
    NotConnected,
    /// Any other platform failure
    Other,
}

/// Trait for sending messages to the companion
///
/// Delivery confirmation arrives later as `Event::Sent` / `Event::SendFailed`
/// and is advisory only: the scheduler's watchdogs decide about retries.
pub trait Transport {
    /// Queue a message for delivery
    fn send(&mut self, message: &Message) -> Result<(), SendError>;
}
