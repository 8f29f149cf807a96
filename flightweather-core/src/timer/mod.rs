//! Handle-keyed single-slot timers
//!
//! One reusable primitive for every "at most one pending timer per slot"
//! need: delayed UI visibility changes and per-flow request watchdogs.

pub mod table;

pub use table::{PendingTimer, TableFull, TimerTable};
