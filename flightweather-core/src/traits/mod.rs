//! Collaborator traits
//!
//! These traits define the interface between the scheduling core and the
//! watch platform: the message transport, the timer service and the UI.

pub mod timer;
pub mod transport;
pub mod ui;

pub use timer::{TimerFacility, TimerId};
pub use transport::{SendError, Transport};
pub use ui::{DisplaySettings, Indicator, MetarAge, Pulse, StatusIcons, UiSink};

/// Everything a handler may touch while processing one event
///
/// Implemented automatically for any type providing all three collaborators,
/// so handlers take a single `&mut impl Platform`.
pub trait Platform: Transport + TimerFacility + UiSink {}

impl<T: Transport + TimerFacility + UiSink> Platform for T {}
