//! Events and request flow state machine
//!
//! Every state change in the core is a reaction to one external event.
//! Request flows are explicit, terminal-free state machines.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{Fault, FlowEvent, FlowState};
